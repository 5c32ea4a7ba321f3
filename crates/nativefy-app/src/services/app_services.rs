// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer, provided to every component as context.

use std::sync::Arc;

use nativefy_bridge::{
    NativefyInterface, NotificationIdentityManager, PushProvider, platform_push_provider,
};
use nativefy_core::AppConfig;
use nativefy_core::error::Result;
use tracing::{info, warn};

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    config: AppConfig,
    identity: Arc<NotificationIdentityManager>,
}

impl AppServices {
    /// Build the services over this platform's push provider. Call once at
    /// app startup.
    ///
    /// Fails with `PlatformUnavailable` where no built-in provider exists;
    /// hosts on those targets construct the services with
    /// [`AppServices::with_provider`] instead.
    pub fn init(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_provider(config, platform_push_provider()?))
    }

    /// Build the services over a provider supplied by the host.
    pub fn with_provider(config: &AppConfig, provider: Arc<dyn PushProvider>) -> Self {
        if config.push_app_id.is_empty() {
            warn!("no push app id configured; notifications will not reach this device");
        }
        let identity = NotificationIdentityManager::new(provider, config.push_app_id.clone());
        info!("app services initialised");
        Self {
            config: config.clone(),
            identity: Arc::new(identity),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<NotificationIdentityManager> {
        &self.identity
    }

    /// The identity manager as the bridge implementation.
    pub fn bridge_impl(&self) -> Arc<dyn NativefyInterface> {
        self.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativefy_bridge::stub::StubPushProvider;

    #[tokio::test]
    async fn injected_provider_backs_the_bridge() {
        let provider = Arc::new(StubPushProvider::new());
        let config = AppConfig {
            push_app_id: "app-id".into(),
            ..AppConfig::default()
        };
        let svc = AppServices::with_provider(&config, provider.clone());

        svc.identity().start().await.unwrap();
        assert_eq!(provider.app_id().as_deref(), Some("app-id"));
        assert!(svc.bridge_impl().get_onesignal_id().await.unwrap().is_some());
    }

    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    #[test]
    fn desktop_builds_without_a_host_provider() {
        let svc = AppServices::init(&AppConfig::default()).unwrap();
        assert!(!svc.identity().session().is_initialized());
    }
}
