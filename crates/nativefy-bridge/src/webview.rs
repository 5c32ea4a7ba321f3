// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridged web view: the stable proxy bound under a fixed interface name,
// plus the origin allow-list and logging options that go with it.
//
// Build exactly one `BridgedWebView` per process. Re-creating it would hand
// the browser surface a different object and force a reload.

use std::sync::Arc;
use std::time::Duration;

use nativefy_core::AppConfig;
use nativefy_core::error::{NativefyError, Result};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::protocol::{BridgeCall, BridgeRequest, BridgeResponse, METHODS};
use crate::proxy::{ImplSlot, NativefyProxy};
use crate::traits::NativefyInterface;

/// Global property name the interface is injected under.
pub const INTERFACE_NAME: &str = "nativefy";

/// Non-enumerable global the host calls to settle a pending call.
const RESOLVER_NAME: &str = "__nativefySettle";

/// Bridge settings fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    /// Log every call and settlement.
    pub log: bool,
    /// Pages allowed to use the bridge. Empty denies everyone.
    pub allowed_origins: Vec<String>,
    /// Optional bound on each forwarded call.
    pub timeout: Option<Duration>,
}

impl BridgeOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            log: config.bridge_log,
            allowed_origins: config.bridge_allow_list(),
            timeout: config.bridge_timeout,
        }
    }

    /// Whether a page at `origin` may call the bridge.
    ///
    /// Entries and callers are compared by scheme, host, and port. Anything
    /// that does not parse as a URL is denied.
    pub fn allows(&self, origin: &str) -> bool {
        let Some(caller) = parse_origin(origin) else {
            return false;
        };
        self.allowed_origins
            .iter()
            .filter_map(|entry| parse_origin(entry))
            .any(|allowed| allowed == caller)
    }
}

fn parse_origin(raw: &str) -> Option<url::Origin> {
    let origin = Url::parse(raw).ok()?.origin();
    origin.is_tuple().then_some(origin)
}

/// The proxy bound to the browser surface together with its options.
pub struct BridgedWebView {
    proxy: Arc<NativefyProxy>,
    options: BridgeOptions,
}

impl BridgedWebView {
    pub fn new(proxy: NativefyProxy, options: BridgeOptions) -> Self {
        Self {
            proxy: Arc::new(proxy),
            options,
        }
    }

    /// A bridged web view over a fresh, empty slot.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            NativefyProxy::new(ImplSlot::new()),
            BridgeOptions::from_config(config),
        )
    }

    pub fn interface_name(&self) -> &'static str {
        INTERFACE_NAME
    }

    /// The object handed to the browser surface. Always the same `Arc`.
    pub fn proxy(&self) -> &Arc<NativefyProxy> {
        &self.proxy
    }

    /// The slot the owning view writes on every render.
    pub fn slot(&self) -> &ImplSlot {
        self.proxy.slot()
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Run one request from a page at `origin` and report its settlement.
    pub async fn dispatch(&self, origin: &str, request: BridgeRequest) -> BridgeResponse {
        let method = request.call.method();
        if self.options.log {
            debug!(origin, id = request.id, method, "bridge call");
        }

        let outcome = if self.options.allows(origin) {
            self.forward(request.call).await
        } else {
            Err(NativefyError::OriginDenied {
                origin: origin.into(),
            })
        };

        match outcome {
            Ok(value) => {
                if self.options.log {
                    debug!(id = request.id, method, %value, "bridge call fulfilled");
                }
                BridgeResponse::fulfilled(request.id, value)
            }
            Err(e) => {
                warn!(id = request.id, method, error = %e, "bridge call rejected");
                BridgeResponse::rejected(request.id, &e)
            }
        }
    }

    /// Parse a raw JSON message, dispatch it, and serialize the response.
    pub async fn handle_message(&self, origin: &str, raw: &str) -> Result<String> {
        let response = match BridgeRequest::parse(raw) {
            Ok(request) => self.dispatch(origin, request).await,
            Err(e) => {
                warn!(origin, error = %e, "malformed bridge message");
                BridgeResponse::rejected(BridgeRequest::id_of(raw), &e)
            }
        };
        Ok(serde_json::to_string(&response)?)
    }

    async fn forward(&self, call: BridgeCall) -> Result<Value> {
        let method = call.method();
        match self.options.timeout {
            Some(after) => tokio::time::timeout(after, invoke(&self.proxy, call))
                .await
                .map_err(|_| NativefyError::Timeout {
                    operation: method,
                    after,
                })?,
            None => invoke(&self.proxy, call).await,
        }
    }

    /// Script the top-level document runs at creation to get `window.nativefy`.
    ///
    /// Install it as the web view's initialization script so it runs in the
    /// content's own origin before any page script. Requests go out over the
    /// host's `window.ipc` channel; responses come back as native calls to a
    /// resolver only this script holds. The script also reports the
    /// document's HTTP status as a [`PageStatus`](crate::protocol::PageStatus).
    pub fn init_script(&self) -> String {
        let methods = METHODS
            .iter()
            .map(|m| match *m {
                "login" => "login: (userId, email) => call('login', email === undefined ? { userId } : { userId, email })".to_string(),
                other => format!("{other}: () => call('{other}')"),
            })
            .collect::<Vec<_>>()
            .join(",\n    ");

        format!(
            r#"(function () {{
  if (window.top !== window || window.{name}) return;
  if (!window.ipc || typeof window.ipc.postMessage !== 'function') {{
    console.error('{name}: native message channel unavailable');
    return;
  }}
  var post = window.ipc.postMessage.bind(window.ipc);
  var nextId = 1;
  var pending = new Map();
  Object.defineProperty(window, '{resolver}', {{
    value: function (response) {{
      var entry = pending.get(response.id);
      if (!entry) return;
      pending.delete(response.id);
      if (response.status === 'fulfilled') entry.resolve(response.value);
      else entry.reject(new Error(response.reason));
    }}
  }});
  function call(method, params) {{
    return new Promise(function (resolve, reject) {{
      var id = nextId++;
      pending.set(id, {{ resolve: resolve, reject: reject }});
      var request = {{ id: id, method: method }};
      if (params !== undefined) request.params = params;
      post(JSON.stringify(request));
    }});
  }}
  window.{name} = Object.freeze({{
    {methods}
  }});
  function reportStatus() {{
    var entries = performance.getEntriesByType ? performance.getEntriesByType('navigation') : [];
    var status = entries.length ? entries[0].responseStatus : 0;
    if (status) post(JSON.stringify({{ pageStatus: status, url: location.href }}));
  }}
  if (document.readyState === 'loading') document.addEventListener('DOMContentLoaded', reportStatus, {{ once: true }});
  else reportStatus();
}})();"#,
            name = INTERFACE_NAME,
            resolver = RESOLVER_NAME,
            methods = methods,
        )
    }

    /// Script the host evaluates in the top-level document to settle the
    /// pending call `response` (a serialized [`BridgeResponse`]) answers.
    pub fn settle_script(&self, response: &str) -> String {
        format!("window.{RESOLVER_NAME} && window.{RESOLVER_NAME}({response});")
    }
}

async fn invoke(proxy: &NativefyProxy, call: BridgeCall) -> Result<Value> {
    match call {
        BridgeCall::Login { user_id, email } => {
            proxy.login(&user_id, email.as_deref()).await?;
            Ok(Value::Null)
        }
        BridgeCall::Logout => {
            proxy.logout().await?;
            Ok(Value::Null)
        }
        BridgeCall::GetOneSignalId => Ok(json!(proxy.get_onesignal_id().await?)),
        BridgeCall::RequestNotificationPermission => {
            Ok(json!(proxy.request_notification_permission().await?))
        }
    }
}
