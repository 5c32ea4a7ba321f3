// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Nativefy: the native side of the web bridge.
//
// The embedded web application talks to a single injected object named
// `nativefy`. That object is a `NativefyProxy` created once for the life of
// the web view; it forwards every call to whichever implementation currently
// sits in its `ImplSlot`. In the shipped shell that implementation is the
// `NotificationIdentityManager`, which wraps the push-notification provider.

pub mod identity;
pub mod protocol;
pub mod proxy;
pub mod readiness;
pub mod traits;
pub mod webview;

pub mod stub;

use std::sync::Arc;

use nativefy_core::error::Result;

pub use identity::{NotificationIdentityManager, NotificationSession, ObserverRegistration};
pub use proxy::{ImplSlot, NativefyProxy};
pub use readiness::{LoadPhase, ReadinessLatch, WebViewHost};
pub use traits::{BrowserSurface, NativefyInterface, PushProvider};
pub use webview::{BridgeOptions, BridgedWebView, INTERFACE_NAME};

/// Push provider for the platform the shell is running on.
///
/// Desktop and CI builds get the in-memory stub so the whole bridge can be
/// exercised without a device. Mobile builds have no built-in provider: the
/// host application owns the vendor SDK and must supply its own.
pub fn platform_push_provider() -> Result<Arc<dyn PushProvider>> {
    #[cfg(any(target_os = "ios", target_os = "android"))]
    {
        Err(nativefy_core::NativefyError::PlatformUnavailable)
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Ok(Arc::new(stub::StubPushProvider::new()))
    }
}
