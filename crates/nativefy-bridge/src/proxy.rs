// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stable bridge proxy.
//
// The web view is wired to one `NativefyProxy` for its whole life. The
// implementation behind it is swapped through an `ImplSlot`, which the owning
// view writes on every render and the proxy reads on every call.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use nativefy_core::error::{NativefyError, Result};

use crate::traits::NativefyInterface;

/// Shared cell holding the live bridge implementation.
///
/// Clones share the same cell.
#[derive(Clone, Default)]
pub struct ImplSlot {
    inner: Arc<RwLock<Option<Arc<dyn NativefyInterface>>>>,
}

impl ImplSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the slot at `implementation`, replacing whatever was there.
    pub fn set(&self, implementation: Arc<dyn NativefyInterface>) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(implementation);
    }

    /// Empty the slot; later proxy calls fail with `BridgeNotMounted`.
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// The implementation to forward to right now.
    pub fn current(&self) -> Result<Arc<dyn NativefyInterface>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(NativefyError::BridgeNotMounted)
    }
}

/// The object injected into the web view. Holds no state besides the slot.
#[derive(Clone)]
pub struct NativefyProxy {
    slot: ImplSlot,
}

impl NativefyProxy {
    pub fn new(slot: ImplSlot) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &ImplSlot {
        &self.slot
    }
}

#[async_trait]
impl NativefyInterface for NativefyProxy {
    async fn login(&self, user_id: &str, email: Option<&str>) -> Result<()> {
        self.slot.current()?.login(user_id, email).await
    }

    async fn logout(&self) -> Result<()> {
        self.slot.current()?.logout().await
    }

    async fn get_onesignal_id(&self) -> Result<Option<String>> {
        self.slot.current()?.get_onesignal_id().await
    }

    async fn request_notification_permission(&self) -> Result<bool> {
        self.slot.current()?.request_notification_permission().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Implementation that answers with fixed values and records calls.
    pub(crate) struct Fixed {
        pub name: &'static str,
        pub granted: bool,
        pub fail: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl Fixed {
        pub(crate) fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                granted: true,
                fail: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                granted: false,
                fail: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn check(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(NativefyError::Push(format!("{} rejected", self.name)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl NativefyInterface for Fixed {
        async fn login(&self, user_id: &str, email: Option<&str>) -> Result<()> {
            self.check(format!("login:{user_id}:{}", email.unwrap_or("-")))
        }

        async fn logout(&self) -> Result<()> {
            self.check("logout".into())
        }

        async fn get_onesignal_id(&self) -> Result<Option<String>> {
            self.check("get_onesignal_id".into())?;
            Ok(Some(format!("{}-subscription", self.name)))
        }

        async fn request_notification_permission(&self) -> Result<bool> {
            self.check("request_notification_permission".into())?;
            Ok(self.granted)
        }
    }

    #[tokio::test]
    async fn empty_slot_rejects_every_method() {
        let proxy = NativefyProxy::new(ImplSlot::new());
        assert!(matches!(
            proxy.login("u", None).await,
            Err(NativefyError::BridgeNotMounted)
        ));
        assert!(matches!(
            proxy.logout().await,
            Err(NativefyError::BridgeNotMounted)
        ));
        assert!(matches!(
            proxy.get_onesignal_id().await,
            Err(NativefyError::BridgeNotMounted)
        ));
        assert!(matches!(
            proxy.request_notification_permission().await,
            Err(NativefyError::BridgeNotMounted)
        ));
    }

    #[tokio::test]
    async fn forwards_to_current_implementation() {
        let slot = ImplSlot::new();
        let proxy = NativefyProxy::new(slot.clone());
        let a = Fixed::new("a");
        let b = Fixed::new("b");

        slot.set(a.clone());
        assert_eq!(
            proxy.get_onesignal_id().await.unwrap().as_deref(),
            Some("a-subscription")
        );

        slot.set(b.clone());
        proxy.login("user-1", Some("u@example.com")).await.unwrap();
        proxy.logout().await.unwrap();
        assert!(proxy.request_notification_permission().await.unwrap());
        assert_eq!(
            proxy.get_onesignal_id().await.unwrap().as_deref(),
            Some("b-subscription")
        );

        assert_eq!(a.calls.lock().unwrap().len(), 1);
        assert_eq!(
            *b.calls.lock().unwrap(),
            vec![
                "login:user-1:u@example.com",
                "logout",
                "request_notification_permission",
                "get_onesignal_id",
            ]
        );
    }

    #[tokio::test]
    async fn rejection_passes_through_unchanged() {
        let slot = ImplSlot::new();
        let proxy = NativefyProxy::new(slot.clone());
        slot.set(Fixed::failing("vendor"));
        let err = proxy.logout().await.unwrap_err();
        assert!(matches!(err, NativefyError::Push(ref msg) if msg == "vendor rejected"));
    }

    #[tokio::test]
    async fn cleared_slot_fails_loudly() {
        let slot = ImplSlot::new();
        let proxy = NativefyProxy::new(slot.clone());
        slot.set(Fixed::new("a"));
        assert!(slot.is_set());
        slot.clear();
        assert!(!slot.is_set());
        assert!(matches!(
            proxy.logout().await,
            Err(NativefyError::BridgeNotMounted)
        ));
    }
}
