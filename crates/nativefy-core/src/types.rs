// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Nativefy shell.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque key-value payload attached to a push notification.
pub type NotificationData = serde_json::Map<String, serde_json::Value>;

/// A push notification as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Custom data sent alongside the notification, if any.
    pub additional_data: Option<NotificationData>,
}

impl Notification {
    pub fn new(notification_id: impl Into<String>) -> Self {
        Self {
            notification_id: notification_id.into(),
            title: None,
            body: None,
            additional_data: None,
        }
    }

    pub fn with_data(mut self, data: NotificationData) -> Self {
        self.additional_data = Some(data);
        self
    }
}

/// How a notification payload reached the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationSource {
    /// Arrived while the app was in the foreground.
    Foreground,
    /// The user tapped the notification.
    Click,
}

/// The most recently captured notification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedNotification {
    pub data: NotificationData,
    pub source: NotificationSource,
    pub received_at: DateTime<Utc>,
}

/// OS-level notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    /// The user has not been asked yet.
    NotDetermined,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Whether the prompt has already been answered one way or the other.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::NotDetermined)
    }
}

/// Events emitted by the embedded browser surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebViewEvent {
    LoadStart,
    LoadEnd,
    /// Network-level failure (DNS, offline, TLS, ...).
    Error { description: String },
    /// The server answered with an HTTP error status.
    HttpError { status_code: u16, url: String },
}

impl WebViewEvent {
    /// Whether this event ends a load attempt, successfully or not.
    ///
    /// Only terminal events may signal readiness.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::LoadStart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_predicates() {
        assert!(PermissionState::Granted.is_granted());
        assert!(!PermissionState::Denied.is_granted());
        assert!(PermissionState::Denied.is_decided());
        assert!(!PermissionState::NotDetermined.is_decided());
    }

    #[test]
    fn only_load_start_is_non_terminal() {
        assert!(!WebViewEvent::LoadStart.is_terminal());
        assert!(WebViewEvent::LoadEnd.is_terminal());
        assert!(
            WebViewEvent::HttpError {
                status_code: 502,
                url: "https://app.example.com".into()
            }
            .is_terminal()
        );
    }
}
