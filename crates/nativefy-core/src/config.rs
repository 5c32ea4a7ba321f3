// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration, read once from the environment at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NativefyError, Result};

/// Bundle / package identifier used when none is configured.
pub const DEFAULT_BUNDLE_ID: &str = "com.empresa.nativefy";

/// How long the embedded content may take to load before it counts as failed.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_WEB_URL: &str = "NATIVEFY_WEB_URL";
pub const ENV_PUSH_APP_ID: &str = "NATIVEFY_ONESIGNAL_APP_ID";
pub const ENV_BUNDLE_ID: &str = "NATIVEFY_BUNDLE_ID";
pub const ENV_PROJECT_ID: &str = "NATIVEFY_PROJECT_ID";
pub const ENV_BRIDGE_LOG: &str = "NATIVEFY_BRIDGE_LOG";
pub const ENV_BRIDGE_TIMEOUT: &str = "NATIVEFY_BRIDGE_TIMEOUT_SECS";
pub const ENV_LOAD_TIMEOUT: &str = "NATIVEFY_LOAD_TIMEOUT_SECS";

/// Startup settings for the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The single web application embedded by the shell. `None` means the
    /// bridge allow-list is empty and every bridge call is denied.
    pub web_url: Option<String>,
    /// Push-notification provider application identifier.
    pub push_app_id: String,
    /// Bundle identifier (iOS) / package name (Android).
    pub bundle_id: String,
    /// Build-service project identifier.
    pub project_id: Option<String>,
    /// Verbose logging of every bridge call.
    pub bridge_log: bool,
    /// Optional upper bound on a single bridge call. `None` waits forever.
    pub bridge_timeout: Option<Duration>,
    /// Watchdog for the initial content load.
    pub load_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web_url: None,
            push_app_id: String::new(),
            bundle_id: DEFAULT_BUNDLE_ID.into(),
            project_id: None,
            bridge_log: cfg!(debug_assertions),
            bridge_timeout: None,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// Malformed numeric or boolean values fall back to defaults so a bad
    /// variable never prevents the shell from starting.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bridge_log = match get(ENV_BRIDGE_LOG) {
            Some(raw) => parse_flag(&raw).unwrap_or(defaults.bridge_log),
            None => defaults.bridge_log,
        };
        let bridge_timeout = get(ENV_BRIDGE_TIMEOUT)
            .and_then(|raw| parse_secs(&raw).ok())
            .filter(|d| !d.is_zero());
        let load_timeout = get(ENV_LOAD_TIMEOUT)
            .and_then(|raw| parse_secs(&raw).ok())
            .unwrap_or(defaults.load_timeout);

        Self {
            web_url: get(ENV_WEB_URL),
            push_app_id: get(ENV_PUSH_APP_ID).unwrap_or_default(),
            bundle_id: get(ENV_BUNDLE_ID).unwrap_or(defaults.bundle_id),
            project_id: get(ENV_PROJECT_ID),
            bridge_log,
            bridge_timeout,
            load_timeout,
        }
    }

    /// The origins allowed to use the bridge: the configured web URL, or
    /// nothing at all.
    pub fn bridge_allow_list(&self) -> Vec<String> {
        self.web_url.iter().cloned().collect()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_secs(raw: &str) -> Result<Duration> {
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| NativefyError::Config(format!("expected seconds, got {raw:?}: {e}")))
}
