// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification identity manager.
//
// Owns the push subsystem lifecycle: one-time initialization, permission
// requests, binding the subscription to the web app's user, and capturing
// the payload of foreground and clicked notifications.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use nativefy_core::error::{NativefyError, Result};
use nativefy_core::types::{NotificationData, NotificationSource, ReceivedNotification};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::traits::{
    ForegroundDisplayEvent, NativefyInterface, NotificationClickEvent, NotificationObserver,
    ObserverId, PushProvider,
};

/// Process-wide notification state.
///
/// `configured` and `prompted` are each set once and never reset; a failed
/// attempt leaves its cell empty so the next caller runs it again. `active`
/// holds the ids of the one observer pair currently registered, if any.
#[derive(Debug, Default)]
pub struct NotificationSession {
    configured: OnceCell<()>,
    prompted: OnceCell<()>,
    active: Mutex<Option<[ObserverId; 2]>>,
    last: Mutex<Option<ReceivedNotification>>,
}

impl NotificationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the provider has been configured with the app id.
    pub fn is_initialized(&self) -> bool {
        self.configured.initialized()
    }

    /// Whether the startup permission request has run.
    pub fn has_prompted(&self) -> bool {
        self.prompted.initialized()
    }

    pub fn is_observing(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Payload of the most recent foreground or clicked notification.
    pub fn last_notification(&self) -> Option<NotificationData> {
        self.last_received().map(|n| n.data)
    }

    pub fn last_received(&self) -> Option<ReceivedNotification> {
        self.last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, data: NotificationData, source: NotificationSource) {
        debug!(?source, keys = data.len(), "captured notification payload");
        let mut slot = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(ReceivedNotification {
            data,
            source,
            received_at: Utc::now(),
        });
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<[ObserverId; 2]>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps the foreground and click observers registered while alive.
///
/// Dropping the registration removes its observers from the provider, unless
/// a newer registration has already taken them over.
pub struct ObserverRegistration {
    provider: Arc<dyn PushProvider>,
    session: Arc<NotificationSession>,
    ids: [ObserverId; 2],
}

impl ObserverRegistration {
    /// Whether this registration still owns the active observer pair.
    pub fn is_active(&self) -> bool {
        *self.session.lock_active() == Some(self.ids)
    }
}

impl Drop for ObserverRegistration {
    fn drop(&mut self) {
        let mut active = self.session.lock_active();
        if *active != Some(self.ids) {
            return;
        }
        for id in self.ids {
            self.provider.remove_observer(id);
        }
        *active = None;
        debug!("notification observers removed");
    }
}

/// Wraps the push provider behind the four bridge verbs.
#[derive(Clone)]
pub struct NotificationIdentityManager {
    provider: Arc<dyn PushProvider>,
    app_id: String,
    session: Arc<NotificationSession>,
}

impl NotificationIdentityManager {
    pub fn new(provider: Arc<dyn PushProvider>, app_id: impl Into<String>) -> Self {
        Self::with_session(provider, app_id, Arc::new(NotificationSession::new()))
    }

    /// Build a manager over an existing session, so a recreated manager keeps
    /// the process-wide startup state and last payload.
    pub fn with_session(
        provider: Arc<dyn PushProvider>,
        app_id: impl Into<String>,
        session: Arc<NotificationSession>,
    ) -> Self {
        Self {
            provider,
            app_id: app_id.into(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<NotificationSession> {
        &self.session
    }

    pub fn last_notification(&self) -> Option<NotificationData> {
        self.session.last_notification()
    }

    /// Configure the provider with the application id, once per session.
    ///
    /// Concurrent callers wait for the first one; none of them proceeds
    /// against an unconfigured provider.
    async fn configure(&self) -> Result<()> {
        self.session
            .configured
            .get_or_try_init(|| async {
                self.provider.initialize(&self.app_id)?;
                info!(app_id = %self.app_id, "push provider initialized");
                Ok::<(), NativefyError>(())
            })
            .await?;
        Ok(())
    }

    /// One-time startup: configure, then ask for permission straight away.
    ///
    /// The prompt runs once per session no matter which call configured the
    /// provider. A failed initial prompt is logged; the web app can ask again
    /// through the bridge.
    pub async fn start(&self) -> Result<()> {
        self.configure().await?;
        self.session
            .prompted
            .get_or_init(|| async {
                match self.provider.request_permission(true).await {
                    Ok(granted) => {
                        info!(granted, "initial notification permission request settled")
                    }
                    Err(e) => warn!(error = %e, "initial notification permission request failed"),
                }
            })
            .await;
        Ok(())
    }

    /// Register the foreground and click observers for the caller's scope.
    ///
    /// A new registration takes over from any earlier one still alive, so a
    /// remounted view never ends up without observers or with two pairs.
    pub fn observe(&self) -> ObserverRegistration {
        let mut active = self.session.lock_active();
        if let Some(previous) = active.take() {
            for id in previous {
                self.provider.remove_observer(id);
            }
            debug!("notification observers handed over");
        }

        let session = Arc::clone(&self.session);
        let foreground = self
            .provider
            .add_observer(NotificationObserver::ForegroundWillDisplay(Arc::new(
                move |event: &ForegroundDisplayEvent| {
                    if let Some(data) = event.notification().additional_data.clone() {
                        session.record(data, NotificationSource::Foreground);
                    }
                    // Providers hide foreground notifications unless told otherwise.
                    event.display();
                },
            )));

        let session = Arc::clone(&self.session);
        let click = self
            .provider
            .add_observer(NotificationObserver::Click(Arc::new(
                move |event: &NotificationClickEvent| {
                    if let Some(data) = event.notification.additional_data.clone() {
                        session.record(data, NotificationSource::Click);
                    }
                },
            )));

        let ids = [foreground, click];
        *active = Some(ids);
        debug!("notification observers registered");
        ObserverRegistration {
            provider: Arc::clone(&self.provider),
            session: Arc::clone(&self.session),
            ids,
        }
    }

    /// Bind the push subscription to `user_id`, then attach `email` if given.
    ///
    /// The email step is best-effort: once the identity bind succeeds a
    /// failure to attach the email is logged and the login still succeeds.
    pub async fn login(&self, user_id: &str, email: Option<&str>) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(NativefyError::InvalidArgument(
                "user id must not be empty".into(),
            ));
        }
        self.configure().await?;
        self.provider.login(user_id).await?;
        info!(user_id, "push subscription bound to user");

        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            if let Err(e) = self.provider.add_email(email) {
                warn!(error = %e, "could not attach email to push user");
            }
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.configure().await?;
        self.provider.logout().await?;
        info!("push subscription unbound from user");
        Ok(())
    }

    /// The device's subscription id. `None` is the normal answer before the
    /// provider has created a subscription.
    pub async fn get_identity(&self) -> Result<Option<String>> {
        self.configure().await?;
        Ok(self.provider.push_subscription_id())
    }

    pub async fn request_permission(&self) -> Result<bool> {
        self.configure().await?;
        self.provider.request_permission(true).await
    }
}

#[async_trait]
impl NativefyInterface for NotificationIdentityManager {
    async fn login(&self, user_id: &str, email: Option<&str>) -> Result<()> {
        NotificationIdentityManager::login(self, user_id, email).await
    }

    async fn logout(&self) -> Result<()> {
        NotificationIdentityManager::logout(self).await
    }

    async fn get_onesignal_id(&self) -> Result<Option<String>> {
        self.get_identity().await
    }

    async fn request_notification_permission(&self) -> Result<bool> {
        self.request_permission().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubPushProvider;
    use nativefy_core::types::Notification;
    use serde_json::json;

    fn manager() -> (Arc<StubPushProvider>, NotificationIdentityManager) {
        let provider = Arc::new(StubPushProvider::new());
        let manager = NotificationIdentityManager::new(provider.clone(), "app-id");
        (provider, manager)
    }

    fn payload(key: &str, value: &str) -> NotificationData {
        let mut data = NotificationData::new();
        data.insert(key.into(), json!(value));
        data
    }

    #[tokio::test]
    async fn start_initializes_once_and_prompts_once() {
        let (provider, manager) = manager();
        manager.start().await.unwrap();
        manager.start().await.unwrap();
        assert!(manager.session().is_initialized());
        assert_eq!(provider.initialize_count(), 1);
        assert_eq!(provider.prompt_count(), 1);
        assert_eq!(provider.app_id().as_deref(), Some("app-id"));
    }

    #[tokio::test]
    async fn failed_initialization_can_be_retried() {
        let (provider, manager) = manager();
        provider.fail_initialize("sdk missing");
        assert!(manager.start().await.is_err());
        assert!(!manager.session().is_initialized());
        assert!(!manager.session().has_prompted());
        assert_eq!(provider.prompt_count(), 0);

        manager.start().await.unwrap();
        assert!(manager.session().is_initialized());
        assert_eq!(provider.initialize_count(), 1);
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn bridge_call_before_start_does_not_skip_prompt() {
        let (provider, manager) = manager();
        assert_eq!(manager.get_identity().await.unwrap(), None);
        assert!(manager.session().is_initialized());
        assert!(!manager.session().has_prompted());

        manager.start().await.unwrap();
        assert_eq!(provider.initialize_count(), 1);
        assert_eq!(provider.prompt_count(), 1);
        assert!(manager.get_identity().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_startup_configures_once() {
        let (provider, manager) = manager();
        let (started, identity, logout) =
            tokio::join!(manager.start(), manager.get_identity(), manager.logout());
        started.unwrap();
        identity.unwrap();
        logout.unwrap();
        assert_eq!(provider.initialize_count(), 1);
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn failed_startup_prompt_is_not_retried() {
        let (provider, manager) = manager();
        provider.fail_next_call("prompt unavailable");
        manager.start().await.unwrap();
        assert!(manager.session().has_prompted());
        manager.start().await.unwrap();
        assert_eq!(provider.prompt_count(), 0);
        // The web app can still ask through the bridge.
        assert!(manager.request_permission().await.unwrap());
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn identity_is_absent_before_subscription() {
        let (_provider, manager) = manager();
        assert_eq!(manager.get_identity().await.unwrap(), None);
    }

    #[tokio::test]
    async fn identity_available_after_permission_granted() {
        let (_provider, manager) = manager();
        assert!(manager.request_permission().await.unwrap());
        let id = manager.get_identity().await.unwrap();
        assert!(id.is_some());
    }

    #[tokio::test]
    async fn permission_twice_does_not_prompt_twice() {
        let (provider, manager) = manager();
        assert!(manager.request_permission().await.unwrap());
        assert!(manager.request_permission().await.unwrap());
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn denied_permission_is_not_an_error() {
        let provider = Arc::new(StubPushProvider::new().answer_prompt_with(false));
        let manager = NotificationIdentityManager::new(provider.clone(), "app-id");
        assert!(!manager.request_permission().await.unwrap());
        assert!(!manager.request_permission().await.unwrap());
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn login_binds_user_and_email() {
        let (provider, manager) = manager();
        manager.login("user-123", Some("user@example.com")).await.unwrap();
        assert_eq!(provider.external_id().as_deref(), Some("user-123"));
        assert_eq!(provider.emails(), vec!["user@example.com".to_string()]);
    }

    #[tokio::test]
    async fn login_rejects_empty_user_id() {
        let (provider, manager) = manager();
        let err = manager.login("  ", None).await.unwrap_err();
        assert!(matches!(err, NativefyError::InvalidArgument(_)));
        assert_eq!(provider.external_id(), None);
    }

    #[tokio::test]
    async fn login_failure_propagates() {
        let (provider, manager) = manager();
        provider.fail_next_call("backend unreachable");
        let err = manager.login("user-123", None).await.unwrap_err();
        assert!(matches!(err, NativefyError::Push(ref msg) if msg.contains("unreachable")));
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_login() {
        let (provider, manager) = manager();
        provider.fail_add_email("invalid email");
        manager.login("user-123", Some("nope")).await.unwrap();
        assert_eq!(provider.external_id().as_deref(), Some("user-123"));
        assert!(provider.emails().is_empty());
    }

    #[tokio::test]
    async fn logout_when_logged_out_is_a_no_op() {
        let (provider, manager) = manager();
        manager.logout().await.unwrap();
        manager.login("user-123", None).await.unwrap();
        manager.logout().await.unwrap();
        manager.logout().await.unwrap();
        assert_eq!(provider.external_id(), None);
    }

    #[test]
    fn observers_capture_payloads_and_force_display() {
        let (provider, manager) = manager();
        let registration = manager.observe();
        assert_eq!(provider.observer_count(), 2);

        let shown = provider
            .deliver_foreground(Notification::new("n1").with_data(payload("route", "/orders/1")));
        assert!(shown);
        assert_eq!(
            manager.last_notification(),
            Some(payload("route", "/orders/1"))
        );

        provider.deliver_click(Notification::new("n2").with_data(payload("route", "/inbox")));
        let last = manager.session().last_received().unwrap();
        assert_eq!(last.source, NotificationSource::Click);
        assert_eq!(last.data, payload("route", "/inbox"));

        drop(registration);
        assert_eq!(provider.observer_count(), 0);
        assert!(!manager.session().is_observing());
    }

    #[test]
    fn notification_without_data_keeps_previous_payload() {
        let (provider, manager) = manager();
        let _registration = manager.observe();
        provider.deliver_click(Notification::new("n1").with_data(payload("k", "v")));
        provider.deliver_click(Notification::new("n2"));
        assert_eq!(manager.last_notification(), Some(payload("k", "v")));
    }

    #[test]
    fn remount_hands_observers_over() {
        let (provider, manager) = manager();
        let first = manager.observe();
        // The next view mounts before the previous one is torn down.
        let second = manager.observe();
        assert_eq!(provider.observer_count(), 2);
        assert!(!first.is_active());
        assert!(second.is_active());

        drop(first);
        assert_eq!(provider.observer_count(), 2);
        assert!(manager.session().is_observing());
        provider.deliver_click(Notification::new("n1").with_data(payload("route", "/a")));
        assert_eq!(manager.last_notification(), Some(payload("route", "/a")));

        drop(second);
        assert_eq!(provider.observer_count(), 0);
        assert!(!manager.session().is_observing());
    }

    #[test]
    fn sequential_mounts_keep_one_pair() {
        let (provider, manager) = manager();
        for _ in 0..3 {
            let registration = manager.observe();
            assert!(registration.is_active());
            assert_eq!(provider.observer_count(), 2);
        }
        assert_eq!(provider.observer_count(), 0);
    }

    #[test]
    fn foreground_is_suppressed_without_observers() {
        let (provider, _manager) = manager();
        assert!(!provider.deliver_foreground(Notification::new("n1")));
    }
}
