// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Nativefy: native shell around a single web application.
//
// Entry point. Initialises logging, builds the bridged web view, and launches
// the Dioxus UI.

mod bridge;
mod components;
mod services;

use std::sync::LazyLock;

use dioxus::prelude::*;
use nativefy_core::NativefyError;
use nativefy_core::human_errors::humanize_error;

use components::app_webview::AppWebView;
use components::load_error::LoadError;
use components::splash::Splash;
use services::app_services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        bundle_id = %bridge::CONFIG.bundle_id,
        web_url = ?bridge::CONFIG.web_url,
        "Nativefy starting"
    );

    // The bridged web view must exist before any view mounts.
    LazyLock::force(&bridge::NATIVEFY_WEBVIEW);

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let services = use_hook(|| {
        let services = AppServices::init(&bridge::CONFIG);
        if let Ok(svc) = &services {
            provide_context(svc.clone());
        }
        services.map_err(|e| {
            tracing::error!(error = %e, "app services unavailable");
            humanize_error(&e)
        })
    });

    // Flips to true once, on the first load-end or load error.
    let mut ready = use_signal(|| false);
    let can_load = services.is_ok() && bridge::CONFIG.web_url.is_some();
    use_hook(move || {
        if bridge::CONFIG.web_url.is_none() {
            tracing::error!("no web URL configured; bridge denies every origin");
        }
        if !can_load {
            ready.set(true);
        }
    });

    let content = match (services, bridge::CONFIG.web_url.clone()) {
        (Ok(_), Some(uri)) => rsx! {
            AppWebView { uri, on_ready: move |_| ready.set(true) }
        },
        (Err(human), _) => rsx! {
            LoadError { error: human, on_retry: move |_| {} }
        },
        (Ok(_), None) => {
            let human = humanize_error(&NativefyError::Config("no web URL configured".into()));
            rsx! {
                LoadError { error: human, on_retry: move |_| {} }
            }
        }
    };

    rsx! {
        div { style: "position: relative; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",
            {content}
            if !ready() {
                Splash {}
            }
        }
    }
}
