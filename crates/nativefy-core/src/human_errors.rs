// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the retry screen.
//
// Content-load failures never crash the shell. They are turned into a short
// heading plus a suggestion, and the screen offers a single "Try again" action.

use crate::error::NativefyError;
use crate::types::WebViewEvent;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or server hiccup; trying again is likely to help.
    Transient,
    /// The user must do something first (connect to the internet, sign in).
    ActionRequired,
    /// Retrying will not help (e.g. the shell has no URL to load).
    Permanent,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the retry button is worth showing.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: &str, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// The message shown for an ordinary connectivity failure.
pub fn connection_failed() -> HumanError {
    HumanError::new(
        "We couldn't load the app.",
        "Check your internet connection and try again.",
        true,
        Severity::ActionRequired,
    )
}

/// Convert a failed load event into something the retry screen can show.
///
/// Returns `None` for events that are not failures.
pub fn humanize_load_event(event: &WebViewEvent) -> Option<HumanError> {
    match event {
        WebViewEvent::LoadStart | WebViewEvent::LoadEnd => None,
        WebViewEvent::Error { description } => Some(humanize_load_detail(description)),
        WebViewEvent::HttpError { status_code, .. } => Some(humanize_http_status(*status_code)),
    }
}

fn humanize_load_detail(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        HumanError::new(
            "The app is taking too long to load.",
            "Your connection may be slow. Try again in a moment.",
            true,
            Severity::Transient,
        )
    } else if lower.contains("certificate") || lower.contains("ssl") || lower.contains("tls") {
        HumanError::new(
            "We couldn't open a secure connection.",
            "Check that the date and time on this device are correct, then try again.",
            true,
            Severity::ActionRequired,
        )
    } else {
        connection_failed()
    }
}

fn humanize_http_status(status: u16) -> HumanError {
    match status {
        401 | 403 => HumanError::new(
            "You don't have access to this page.",
            "Sign in again, then try again.",
            true,
            Severity::ActionRequired,
        ),
        404 | 410 => HumanError::new(
            "This page could not be found.",
            "The app may be updating. Try again later.",
            true,
            Severity::Permanent,
        ),
        500..=599 => HumanError::new(
            "The service is having trouble right now.",
            "This is usually temporary. Try again in a few minutes.",
            true,
            Severity::Transient,
        ),
        _ => connection_failed(),
    }
}

/// Convert a `NativefyError` into a `HumanError`.
pub fn humanize_error(err: &NativefyError) -> HumanError {
    match err {
        NativefyError::ContentLoad(detail) => humanize_load_detail(detail),
        NativefyError::Timeout { .. } => humanize_load_detail("timed out"),
        NativefyError::Config(detail) => HumanError {
            message: "This app is not set up correctly.".into(),
            suggestion: format!("Please contact the app's support team. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
        NativefyError::Push(_) => HumanError::new(
            "Notifications aren't working right now.",
            "You can keep using the app. Try again later.",
            true,
            Severity::Transient,
        ),
        NativefyError::PlatformUnavailable => HumanError::new(
            "This app can't deliver notifications on this device.",
            "Please contact the app's support team.",
            false,
            Severity::Permanent,
        ),
        NativefyError::BridgeNotMounted
        | NativefyError::OriginDenied { .. }
        | NativefyError::UnknownMethod(_)
        | NativefyError::InvalidArgument(_)
        | NativefyError::Serialization(_) => HumanError {
            message: "Something went wrong.".into(),
            suggestion: format!("Try again. If it keeps happening, restart the app. ({err})"),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
