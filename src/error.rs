//! Error types and handling for postal-screen.
//!
//! Only the worker pool can fail. Address scoring has no error path: degenerate
//! input always produces a number.

use std::fmt;

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a caller's context stopped a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The caller cancelled the call explicitly.
    Canceled,
    /// The caller's deadline passed before the worker answered.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Canceled => f.write_str("context canceled"),
            CancelReason::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Error types for address parsing operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid pool configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// One or more workers did not become ready
    #[error("Worker startup failed: {message}")]
    Startup {
        /// Which worker failed and why
        message: String,
    },

    /// A worker could not parse the submitted text
    #[error("Failed to parse address {text:?}: {message}")]
    Parse {
        /// The text that was submitted
        text: String,
        /// Error reported by the worker
        message: String,
    },

    /// The caller's context ended before the worker answered
    #[error("Call cancelled: {reason}")]
    Cancelled {
        /// Cancellation or deadline
        reason: CancelReason,
    },

    /// Dispatch attempted during or after shutdown
    #[error("Worker pool is closed")]
    PoolClosed,

    /// The pool was built with `enabled = false`
    #[error("Address parsing is disabled")]
    Disabled,

    /// Every worker has been removed from rotation
    #[error("No address parser workers available ({instances} configured)")]
    Unavailable {
        /// Number of workers the pool was built with
        instances: usize,
    },

    /// The request to a worker failed below the HTTP layer
    #[error("Worker {ordinal} transport error: {message}")]
    Transport {
        /// Worker ordinal
        ordinal: usize,
        /// Error message
        message: String,
        /// No connection could be established to the worker
        refused: bool,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new startup error
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            text: text.into(),
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport(ordinal: usize, message: impl Into<String>) -> Self {
        Self::Transport {
            ordinal,
            message: message.into(),
            refused: false,
        }
    }

    /// Create a transport error for a worker that could not be connected to
    pub fn refused(ordinal: usize, message: impl Into<String>) -> Self {
        Self::Transport {
            ordinal,
            message: message.into(),
            refused: true,
        }
    }

    /// Whether the worker was not accepting connections at all.
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Transport { refused: true, .. })
    }

    /// Whether the caller's context ended the call.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether a caller-side retry of the same call could succeed.
    ///
    /// Transport failures and cancellations are retryable; configuration,
    /// parse and lifecycle errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Cancelled { .. })
    }
}
