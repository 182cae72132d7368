//! # platboard - Terminal Departure Board
//!
//! A live departure-board display for the terminal, fed by a server-sent
//! event stream of allocation updates (service slot assignments).
//!
//! ## Features
//!
//! - **Resilient feed**: single long-lived subscription with exponential
//!   backoff reconnection; the board keeps recovering unattended
//! - **Live countdown table**: per-second recompute of relative departure
//!   times from the latest snapshot
//! - **Announcement ticker**: rotating notice strip paced by its own scroll
//!   animation, plus a wall clock
//! - **Terminal UI**: flicker-free full-screen rendering via ratatui
//!
//! ## Architecture
//!
//! The library is organized into focused modules following modern Rust patterns:
//!
//! - [`error`] - Centralized error types and handling
//! - [`alloc`] - Allocation data model and render projection
//! - [`feed`] - Connection manager: subscription, backoff, status
//! - [`board`] - Board state and terminal rendering
//! - [`app`] - Application core and component coordination

// Core modules
pub mod alloc;
pub mod error;

// Subsystems
pub mod board;
pub mod feed;
pub mod input;

// Core components
pub mod app;

// Re-export commonly used types for convenience
pub use error::{BoardError, Result};

// Public API surface for external usage
pub use alloc::{Allocation, RenderedRow, Snapshot};
pub use app::{AppOptions, Application};
pub use feed::{ConnectionStatus, FeedConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
