// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide bridge wiring.
//
// The bridged web view is built once here, outside any component, so no
// re-render can hand the content webview a different proxy.

use std::sync::LazyLock;

use nativefy_bridge::BridgedWebView;
use nativefy_bridge::protocol::PageStatus;
use nativefy_core::AppConfig;
use nativefy_core::types::WebViewEvent;

pub static CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::from_env);

pub static NATIVEFY_WEBVIEW: LazyLock<BridgedWebView> = LazyLock::new(|| {
    let webview = BridgedWebView::from_config(&CONFIG);
    tracing::info!(
        interface = webview.interface_name(),
        allowed_origins = ?webview.options().allowed_origins,
        log = webview.options().log,
        "bridged web view created"
    );
    webview
});

/// What the content webview reports to the view that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEvent {
    /// A load event from the engine, or an HTTP error the page reported.
    Load(WebViewEvent),
    /// A bridge request posted by the page at `origin`.
    Call { origin: String, payload: String },
}

impl ContentEvent {
    /// Sort a message the page posted over the host channel.
    ///
    /// Status reports below 400 carry nothing for the host and yield `None`.
    pub fn from_ipc(origin: String, body: String) -> Option<Self> {
        match PageStatus::parse(&body) {
            Some(status) => status.load_event().map(Self::Load),
            None => Some(Self::Call {
                origin,
                payload: body,
            }),
        }
    }
}
