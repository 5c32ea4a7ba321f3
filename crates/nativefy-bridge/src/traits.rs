// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait seams between the shell, the web content, and the push SDK.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use nativefy_core::error::Result;
use nativefy_core::types::Notification;

/// The interface exposed to the embedded web application.
///
/// Method names and shapes are shared with the web side. Changing any of
/// them requires a coordinated release of both sides.
#[async_trait]
pub trait NativefyInterface: Send + Sync {
    /// Bind the push subscription to the web app's user.
    async fn login(&self, user_id: &str, email: Option<&str>) -> Result<()>;

    /// Unbind the current user from the push subscription.
    async fn logout(&self) -> Result<()>;

    /// The device's push subscription id, or `None` before one exists.
    async fn get_onesignal_id(&self) -> Result<Option<String>>;

    /// Prompt for notification permission (if undecided) and report whether
    /// it is granted.
    async fn request_notification_permission(&self) -> Result<bool>;
}

/// Handle returned when an observer is registered with a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// A notification about to be shown while the app is in the foreground.
///
/// Providers suppress foreground notifications unless an observer calls
/// [`ForegroundDisplayEvent::display`].
#[derive(Debug)]
pub struct ForegroundDisplayEvent {
    notification: Notification,
    display: AtomicBool,
}

impl ForegroundDisplayEvent {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            display: AtomicBool::new(false),
        }
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Ask the provider to show the notification anyway.
    pub fn display(&self) {
        self.display.store(true, Ordering::SeqCst);
    }

    pub fn display_requested(&self) -> bool {
        self.display.load(Ordering::SeqCst)
    }
}

/// The user tapped a notification.
#[derive(Debug, Clone)]
pub struct NotificationClickEvent {
    pub notification: Notification,
}

pub type ForegroundHandler = Arc<dyn Fn(&ForegroundDisplayEvent) + Send + Sync>;
pub type ClickHandler = Arc<dyn Fn(&NotificationClickEvent) + Send + Sync>;

/// The observers a provider accepts.
#[derive(Clone)]
pub enum NotificationObserver {
    ForegroundWillDisplay(ForegroundHandler),
    Click(ClickHandler),
}

impl std::fmt::Debug for NotificationObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForegroundWillDisplay(_) => f.write_str("ForegroundWillDisplay(..)"),
            Self::Click(_) => f.write_str("Click(..)"),
        }
    }
}

/// The push-notification SDK as seen by the shell.
///
/// Delivery, device registration transport, and server-side targeting live
/// behind this trait and are the provider's concern.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Configure the SDK with the application identifier.
    fn initialize(&self, app_id: &str) -> Result<()>;

    /// Show the OS permission prompt if the user has not decided yet and
    /// resolve to whether permission is granted. When `fallback_to_settings`
    /// is set and permission was previously denied, the provider may direct
    /// the user to the system settings instead.
    async fn request_permission(&self, fallback_to_settings: bool) -> Result<bool>;

    /// Associate the subscription with an external user id.
    async fn login(&self, external_id: &str) -> Result<()>;

    /// Attach an email address to the current user. The SDK does not report
    /// when (or whether) this reaches the backend.
    fn add_email(&self, email: &str) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    fn push_subscription_id(&self) -> Option<String>;

    fn add_observer(&self, observer: NotificationObserver) -> ObserverId;

    fn remove_observer(&self, id: ObserverId);
}

/// Imperative side of the embedded browser surface.
///
/// An `Err` means the surface could not even start the navigation; failures
/// of the load itself arrive later as [`WebViewEvent`]s.
///
/// [`WebViewEvent`]: nativefy_core::types::WebViewEvent
pub trait BrowserSurface {
    /// Navigate to `uri`.
    fn load(&self, uri: &str) -> Result<()>;

    /// Reload the current page.
    fn reload(&self) -> Result<()>;
}
