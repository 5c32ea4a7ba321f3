// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load tracking and readiness signalling for the embedded browser surface.
//
// The shell is "ready" (splash may go) on the first load-end or load error,
// whichever comes first. An error must not hold the splash forever: the user
// needs to see the retry screen.

use nativefy_core::error::{NativefyError, Result};
use nativefy_core::human_errors::{HumanError, humanize_error, humanize_load_event};
use nativefy_core::types::WebViewEvent;
use tracing::{debug, info, warn};

use crate::traits::BrowserSurface;

/// One-shot "already signalled ready" latch, re-armed by a manual reload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessLatch {
    signaled: bool,
}

impl ReadinessLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per armed cycle.
    pub fn signal(&mut self) -> bool {
        !std::mem::replace(&mut self.signaled, true)
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    pub fn rearm(&mut self) {
        self.signaled = false;
    }
}

/// What the content area should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Loaded,
    /// The retry screen, with the message to show on it.
    Failed(HumanError),
}

/// Host-side state for the embedded browser surface.
#[derive(Debug, Clone)]
pub struct WebViewHost {
    latch: ReadinessLatch,
    phase: LoadPhase,
    reloads: u32,
}

impl Default for WebViewHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WebViewHost {
    pub fn new() -> Self {
        Self {
            latch: ReadinessLatch::new(),
            phase: LoadPhase::Loading,
            reloads: 0,
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// Number of user-triggered reloads so far.
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn latch(&self) -> &ReadinessLatch {
        &self.latch
    }

    /// Whether the content itself should be on screen rather than the
    /// spinner or retry screen.
    ///
    /// Once the content has been shown, later navigations inside it keep it
    /// visible while they load.
    pub fn shows_content(&self) -> bool {
        match self.phase {
            LoadPhase::Loaded => true,
            LoadPhase::Loading => self.latch.is_signaled(),
            LoadPhase::Failed(_) => false,
        }
    }

    /// Start loading `uri` on the surface.
    ///
    /// Returns `true` when the surface refused outright and readiness should
    /// be signalled for the resulting retry screen.
    pub fn load(&mut self, surface: &dyn BrowserSurface, uri: &str) -> bool {
        self.phase = LoadPhase::Loading;
        info!(uri, "loading web content");
        self.settle(surface.load(uri))
    }

    /// Feed a browser event. Returns `true` when readiness should be signalled.
    pub fn handle(&mut self, event: &WebViewEvent) -> bool {
        if !event.is_terminal() {
            if self.phase != LoadPhase::Loading {
                debug!("content load started");
            }
            self.phase = LoadPhase::Loading;
            return false;
        }
        match humanize_load_event(event) {
            Some(human) => {
                warn!(?event, "web content failed to load");
                self.phase = LoadPhase::Failed(human);
            }
            // Load-end also follows a failed load; keep the retry screen.
            None if matches!(self.phase, LoadPhase::Failed(_)) => {}
            None => self.phase = LoadPhase::Loaded,
        }
        self.latch.signal()
    }

    /// Show the retry screen for a failure raised outside the surface's own
    /// events, such as the load watchdog. Returns `true` when readiness should
    /// be signalled.
    pub fn fail(&mut self, err: &NativefyError) -> bool {
        warn!(error = %err, "web content failed to load");
        self.phase = LoadPhase::Failed(humanize_error(err));
        self.latch.signal()
    }

    /// User-triggered reload from the retry screen.
    ///
    /// Returns `true` when the surface refused to reload.
    pub fn reload(&mut self, surface: &dyn BrowserSurface) -> bool {
        self.latch.rearm();
        self.phase = LoadPhase::Loading;
        self.reloads += 1;
        info!(attempt = self.reloads, "reloading web content");
        self.settle(surface.reload())
    }

    fn settle(&mut self, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => false,
            Err(e) => self.fail(&e),
        }
    }
}
