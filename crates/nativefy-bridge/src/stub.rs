// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory push provider for desktop/CI builds where no vendor SDK exists.
//
// Simulates the parts of the SDK the shell depends on: a single OS
// permission prompt, a subscription id that appears once permission is
// granted, external-id binding, and observer dispatch. Failure injection
// hooks make it usable as a test double.

use std::sync::Mutex;

use async_trait::async_trait;
use nativefy_core::error::{NativefyError, Result};
use nativefy_core::types::{Notification, PermissionState};
use uuid::Uuid;

use crate::traits::{
    ForegroundDisplayEvent, NotificationClickEvent, NotificationObserver, ObserverId,
    PushProvider,
};

#[derive(Debug)]
struct StubState {
    app_id: Option<String>,
    initialize_count: u32,
    permission: PermissionState,
    prompt_answer: bool,
    prompt_count: u32,
    subscription_id: Option<String>,
    external_id: Option<String>,
    emails: Vec<String>,
    observers: Vec<(ObserverId, NotificationObserver)>,
    next_observer: u64,
    fail_initialize: Option<String>,
    fail_next_call: Option<String>,
    fail_add_email: Option<String>,
}

/// Push provider that keeps everything in memory.
#[derive(Debug)]
pub struct StubPushProvider {
    state: Mutex<StubState>,
}

impl Default for StubPushProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StubPushProvider {
    /// A provider whose simulated user grants permission when prompted.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                app_id: None,
                initialize_count: 0,
                permission: PermissionState::NotDetermined,
                prompt_answer: true,
                prompt_count: 0,
                subscription_id: None,
                external_id: None,
                emails: Vec::new(),
                observers: Vec::new(),
                next_observer: 1,
                fail_initialize: None,
                fail_next_call: None,
                fail_add_email: None,
            }),
        }
    }

    /// How the simulated user answers the permission prompt.
    pub fn answer_prompt_with(self, grant: bool) -> Self {
        self.lock().prompt_answer = grant;
        self
    }

    /// Make the next `initialize` call fail.
    pub fn fail_initialize(&self, reason: &str) {
        self.lock().fail_initialize = Some(reason.into());
    }

    /// Make the next async SDK call (login, logout, permission) fail.
    pub fn fail_next_call(&self, reason: &str) {
        self.lock().fail_next_call = Some(reason.into());
    }

    /// Make the next `add_email` call fail.
    pub fn fail_add_email(&self, reason: &str) {
        self.lock().fail_add_email = Some(reason.into());
    }

    pub fn app_id(&self) -> Option<String> {
        self.lock().app_id.clone()
    }

    pub fn initialize_count(&self) -> u32 {
        self.lock().initialize_count
    }

    pub fn prompt_count(&self) -> u32 {
        self.lock().prompt_count
    }

    pub fn external_id(&self) -> Option<String> {
        self.lock().external_id.clone()
    }

    pub fn emails(&self) -> Vec<String> {
        self.lock().emails.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Deliver a notification while the app is in the foreground.
    ///
    /// Returns whether it ends up displayed.
    pub fn deliver_foreground(&self, notification: Notification) -> bool {
        let event = ForegroundDisplayEvent::new(notification);
        for observer in self.observers() {
            if let NotificationObserver::ForegroundWillDisplay(handler) = observer {
                handler(&event);
            }
        }
        event.display_requested()
    }

    /// Simulate the user tapping a notification.
    pub fn deliver_click(&self, notification: Notification) {
        let event = NotificationClickEvent { notification };
        for observer in self.observers() {
            if let NotificationObserver::Click(handler) = observer {
                handler(&event);
            }
        }
    }

    // Handlers run without the state lock so they may call back into the provider.
    fn observers(&self) -> Vec<NotificationObserver> {
        self.lock()
            .observers
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(state: &mut StubState) -> Result<()> {
        match state.fail_next_call.take() {
            Some(reason) => Err(NativefyError::Push(reason)),
            None => Ok(()),
        }
    }

    fn require_initialized(state: &StubState) -> Result<()> {
        if state.app_id.is_none() {
            return Err(NativefyError::Push("provider not initialized".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PushProvider for StubPushProvider {
    fn initialize(&self, app_id: &str) -> Result<()> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_initialize.take() {
            return Err(NativefyError::Push(reason));
        }
        state.app_id = Some(app_id.into());
        state.initialize_count += 1;
        tracing::debug!(app_id, "stub push provider initialized");
        Ok(())
    }

    async fn request_permission(&self, _fallback_to_settings: bool) -> Result<bool> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Self::require_initialized(&state)?;
        if !state.permission.is_decided() {
            state.prompt_count += 1;
            state.permission = if state.prompt_answer {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
            tracing::info!(permission = ?state.permission, "stub permission prompt answered");
        }
        if state.permission.is_granted() && state.subscription_id.is_none() {
            state.subscription_id = Some(Uuid::new_v4().to_string());
        }
        Ok(state.permission.is_granted())
    }

    async fn login(&self, external_id: &str) -> Result<()> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Self::require_initialized(&state)?;
        state.external_id = Some(external_id.into());
        Ok(())
    }

    fn add_email(&self, email: &str) -> Result<()> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_add_email.take() {
            return Err(NativefyError::Push(reason));
        }
        if state.external_id.is_none() {
            return Err(NativefyError::Push("no user logged in".into()));
        }
        if !state.emails.iter().any(|e| e == email) {
            state.emails.push(email.into());
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Self::require_initialized(&state)?;
        state.external_id = None;
        state.emails.clear();
        Ok(())
    }

    fn push_subscription_id(&self) -> Option<String> {
        self.lock().subscription_id.clone()
    }

    fn add_observer(&self, observer: NotificationObserver) -> ObserverId {
        let mut state = self.lock();
        let id = ObserverId(state.next_observer);
        state.next_observer += 1;
        state.observers.push((id, observer));
        id
    }

    fn remove_observer(&self, id: ObserverId) {
        self.lock().observers.retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let provider = StubPushProvider::new();
        assert!(matches!(
            provider.login("u").await,
            Err(NativefyError::Push(_))
        ));
    }

    #[tokio::test]
    async fn subscription_appears_only_after_grant() {
        let provider = StubPushProvider::new();
        provider.initialize("app").unwrap();
        assert_eq!(provider.push_subscription_id(), None);
        assert!(provider.request_permission(true).await.unwrap());
        let id = provider.push_subscription_id().unwrap();
        provider.request_permission(true).await.unwrap();
        assert_eq!(provider.push_subscription_id(), Some(id));
    }

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let provider = StubPushProvider::new();
        provider.initialize("app").unwrap();
        provider.fail_next_call("offline");
        assert!(provider.logout().await.is_err());
        assert!(provider.logout().await.is_ok());
    }

    #[test]
    fn removing_unknown_observer_is_harmless() {
        let provider = StubPushProvider::new();
        provider.remove_observer(ObserverId(42));
        assert_eq!(provider.observer_count(), 0);
    }
}
