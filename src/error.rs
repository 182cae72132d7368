//! Error types and handling infrastructure for platboard.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for application-level error handling with context.
//!
//! ## Design Principles
//!
//! - **Nothing in the feed path is fatal**: transport and payload errors are
//!   surfaced as values so the reconnect loop can keep running unattended
//! - **Context preservation**: include relevant information for diagnostics
//! - **Consistency**: standardized Result type across all modules

use thiserror::Error;

/// The main error type for platboard operations.
///
/// This enum covers the error conditions that can occur while maintaining the
/// live feed subscription, decoding allocation payloads, and driving the
/// terminal interface.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Transport-level failure on the feed connection (refused, dropped,
    /// endpoint unreachable). Always routed through the retry path.
    #[error("Feed transport failed: {message}")]
    Transport { message: String },

    /// A single inbound message could not be decoded as an allocation list.
    #[error("Allocation payload invalid: {message}")]
    Payload { message: String },

    /// Configuration related errors (endpoint URL, event name, backoff bounds)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    Ui { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for platboard operations.
///
/// This type alias provides a consistent error handling interface across
/// all modules in the platboard codebase.
pub type Result<T> = std::result::Result<T, BoardError>;

impl BoardError {
    /// Create a Transport error with a descriptive message
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a Payload error with a descriptive message
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a Ui error with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

// Terminal setup/teardown and draw calls surface io::Error.
impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        Self::Ui {
            message: err.to_string(),
        }
    }
}

// Allocation payload decoding.
impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload {
            message: err.to_string(),
        }
    }
}

// Anything the HTTP client reports (bad URL, refused connection, dropped
// body stream) is a transport failure and feeds the retry loop.
impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}
