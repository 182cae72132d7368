//! Board renderer trait.
//!
//! This module defines the `BoardRenderer` trait separating board state from
//! the terminal that paints it, with lifecycle hooks for initialization and
//! cleanup.

use crate::board::state::BoardState;
use crate::error::Result;

/// Core trait for painting the departure board
pub trait BoardRenderer {
    /// Render the current board state to the terminal
    ///
    /// This method should:
    /// - Redraw the header, allocation table, ticker strip, and status line
    /// - Apply the theme's service-type and countdown styles
    /// - Handle terminal resizing
    fn render(&mut self, state: &BoardState) -> Result<()>;

    /// Initialize the terminal UI
    ///
    /// This method should:
    /// - Set up raw mode
    /// - Enter the alternate screen
    fn initialize(&mut self) -> Result<()>;

    /// Clean up and restore terminal state
    ///
    /// This method should:
    /// - Exit raw mode
    /// - Leave the alternate screen
    fn cleanup(&mut self) -> Result<()>;

    /// Get current terminal dimensions
    fn get_terminal_size(&self) -> Result<(u16, u16)>; // (width, height)
}
