// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire format for bridge calls crossing the native/web boundary.
//
// Request:  {"id": 7, "method": "login", "params": {"userId": "u1", "email": "a@b.c"}}
// Response: {"id": 7, "status": "fulfilled", "value": null}
//           {"id": 7, "status": "rejected", "reason": "..."}
// Status:   {"pageStatus": 404, "url": "https://..."}   (page to native, unanswered)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nativefy_core::error::{NativefyError, Result};
use nativefy_core::types::WebViewEvent;

/// One bridge method invocation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum BridgeCall {
    #[serde(rename_all = "camelCase")]
    Login {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    Logout,
    GetOneSignalId,
    RequestNotificationPermission,
}

impl BridgeCall {
    /// The method name as seen by the web side.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::GetOneSignalId => "getOneSignalId",
            Self::RequestNotificationPermission => "requestNotificationPermission",
        }
    }
}

/// Every method on the bridge, in declaration order.
pub const METHODS: [&str; 4] = [
    "login",
    "logout",
    "getOneSignalId",
    "requestNotificationPermission",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: u64,
    #[serde(flatten)]
    pub call: BridgeCall,
}

impl BridgeRequest {
    /// Parse a raw message, distinguishing unknown methods from other
    /// malformed input.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if let Some(method) = value.get("method").and_then(Value::as_str) {
            if !METHODS.contains(&method) {
                return Err(NativefyError::UnknownMethod(method.into()));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Best-effort id extraction so even a malformed request gets an answer.
    pub fn id_of(raw: &str) -> u64 {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|v| v.get("id").and_then(Value::as_u64))
            .unwrap_or(0)
    }
}

/// How a call settled, mirroring a promise settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Settlement {
    Fulfilled { value: Value },
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub id: u64,
    #[serde(flatten)]
    pub settlement: Settlement,
}

impl BridgeResponse {
    pub fn fulfilled(id: u64, value: Value) -> Self {
        Self {
            id,
            settlement: Settlement::Fulfilled { value },
        }
    }

    pub fn rejected(id: u64, err: &NativefyError) -> Self {
        Self {
            id,
            settlement: Settlement::Rejected {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self.settlement, Settlement::Fulfilled { .. })
    }
}

/// HTTP status of the top-level document, reported by the page once parsed.
///
/// Engines do not surface the main document's status to the host, so the
/// injected script reads it from the navigation timing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageStatus {
    pub page_status: u16,
    pub url: String,
}

impl PageStatus {
    /// `None` when `raw` is anything other than a status report.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// The load event this status amounts to, if it is an error.
    pub fn load_event(&self) -> Option<WebViewEvent> {
        (self.page_status >= 400).then(|| WebViewEvent::HttpError {
            status_code: self.page_status,
            url: self.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_login_with_optional_email() {
        let req = BridgeRequest::parse(
            r#"{"id":3,"method":"login","params":{"userId":"user-123","email":"u@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(req.id, 3);
        assert_eq!(
            req.call,
            BridgeCall::Login {
                user_id: "user-123".into(),
                email: Some("u@example.com".into())
            }
        );

        let req =
            BridgeRequest::parse(r#"{"id":4,"method":"login","params":{"userId":"u"}}"#).unwrap();
        assert_eq!(
            req.call,
            BridgeCall::Login {
                user_id: "u".into(),
                email: None
            }
        );
    }

    #[test]
    fn parses_unit_methods_without_params() {
        let req = BridgeRequest::parse(r#"{"id":1,"method":"getOneSignalId"}"#).unwrap();
        assert_eq!(req.call, BridgeCall::GetOneSignalId);
        assert_eq!(req.call.method(), "getOneSignalId");
    }

    #[test]
    fn unknown_method_is_reported_by_name() {
        let err = BridgeRequest::parse(r#"{"id":9,"method":"deleteEverything"}"#).unwrap_err();
        assert!(matches!(err, NativefyError::UnknownMethod(ref m) if m == "deleteEverything"));
        assert_eq!(BridgeRequest::id_of(r#"{"id":9,"method":"x"}"#), 9);
        assert_eq!(BridgeRequest::id_of("not json"), 0);
    }

    #[test]
    fn response_shapes() {
        let ok = serde_json::to_value(BridgeResponse::fulfilled(5, json!(true))).unwrap();
        assert_eq!(ok, json!({"id": 5, "status": "fulfilled", "value": true}));

        let err = BridgeResponse::rejected(6, &NativefyError::BridgeNotMounted);
        let err = serde_json::to_value(err).unwrap();
        assert_eq!(err["status"], "rejected");
        assert_eq!(err["id"], 6);
        assert!(err["reason"].as_str().unwrap().contains("mounted"));
    }

    #[test]
    fn page_status_is_told_apart_from_calls() {
        assert_eq!(PageStatus::parse(r#"{"id":1,"method":"logout"}"#), None);

        let ok = PageStatus::parse(r#"{"pageStatus":200,"url":"https://app.example.com/"}"#)
            .unwrap();
        assert_eq!(ok.load_event(), None);

        let missing =
            PageStatus::parse(r#"{"pageStatus":404,"url":"https://app.example.com/x"}"#).unwrap();
        assert_eq!(
            missing.load_event(),
            Some(WebViewEvent::HttpError {
                status_code: 404,
                url: "https://app.example.com/x".into()
            })
        );
    }
}
