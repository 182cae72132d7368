//! Display subsystem: board state and terminal rendering.
//!
//! Separates "compute what to render" ([`state::BoardState`] plus the pure
//! projection in [`crate::alloc`]) from "how to paint it" (the ratatui
//! adapter in [`terminal`]), so the refresh logic is testable without a
//! terminal.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod ticker;

// Re-export public API
pub use renderer::BoardRenderer;
pub use state::BoardState;
pub use terminal::TerminalBoard;
pub use theme::BoardTheme;
pub use ticker::{Marquee, Ticker};

#[cfg(test)]
pub use renderer::tests::MockBoardRenderer;
