// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Nativefy.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Nativefy operations.
#[derive(Debug, Error)]
pub enum NativefyError {
    // -- Bridge --
    /// A bridge method ran before the owning view populated the live slot.
    #[error("bridge used before the web view was mounted")]
    BridgeNotMounted,

    #[error("origin {origin} is not allowed to use the bridge")]
    OriginDenied { origin: String },

    #[error("unknown bridge method: {0}")]
    UnknownMethod(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{operation} did not settle within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    // -- Push notifications --
    #[error("push notification provider error: {0}")]
    Push(String),

    // -- Embedded content --
    #[error("content failed to load: {0}")]
    ContentLoad(String),

    // -- Configuration / platform --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No push provider exists for this target unless the host supplies one.
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NativefyError>;
