//! Color theme and styling definitions using ratatui colors
//!
//! This module provides color themes for the departure board using ratatui's
//! color system directly to avoid unnecessary abstractions.

use ratatui::style::{Color, Style};

/// Color theme for the board's visual elements
#[derive(Debug, Clone)]
pub struct BoardTheme {
    /// Header bar (platform number and line name)
    pub header: Style,

    /// Clock readout in the header
    pub clock: Style,

    /// Table column headings
    pub column_heading: Style,

    /// Countdown column
    pub countdown: Style,

    /// Announcement strip
    pub ticker: Style,

    /// Status line (connection state / endpoint prompt)
    pub status: Style,

    /// "local" service rows
    local_service: Style,
    /// "express" service rows
    express_service: Style,
    /// "out-of-service" runs
    out_of_service: Style,
}

impl Default for BoardTheme {
    /// Default theme after the classic black departure board
    fn default() -> Self {
        Self {
            header: Style::default().fg(Color::White).bg(Color::Blue),
            clock: Style::default().fg(Color::White).bg(Color::Black),
            column_heading: Style::default().fg(Color::Gray),
            countdown: Style::default().fg(Color::Green),
            ticker: Style::default().fg(Color::White),
            status: Style::default().fg(Color::White).bg(Color::Blue),
            local_service: Style::default().fg(Color::Green),
            express_service: Style::default().fg(Color::Yellow),
            out_of_service: Style::default().fg(Color::DarkGray),
        }
    }
}

impl BoardTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            header: Style::default().fg(Color::Black).bg(Color::White),
            clock: Style::default(),
            column_heading: Style::default(),
            countdown: Style::default(),
            ticker: Style::default(),
            status: Style::default().fg(Color::Black).bg(Color::White),
            local_service: Style::default(),
            express_service: Style::default(),
            out_of_service: Style::default(),
        }
    }

    /// Style for a service-type cell. Unknown types fall back to the
    /// terminal default.
    pub fn service_style(&self, service_type: &str) -> Style {
        match service_type {
            "local" => self.local_service,
            "express" => self.express_service,
            "out-of-service" => self.out_of_service,
            _ => Style::default(),
        }
    }
}
