//! Terminal board implementation using ratatui
//!
//! This module provides the concrete implementation of `BoardRenderer` using
//! ratatui for a cross-platform terminal interface. It only paints; board
//! state is owned and updated by the application runtime.

use crate::board::renderer::BoardRenderer;
use crate::board::state::BoardState;
use crate::board::theme::BoardTheme;
use crate::error::Result;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Departure board renderer with ratatui backend
pub struct TerminalBoard {
    terminal: Option<CrosstermTerminal>,
    theme: BoardTheme,
    line_name: String,
    platform: String,
}

impl TerminalBoard {
    /// Create a new terminal board for the given line/platform labels
    pub fn new(line_name: impl Into<String>, platform: impl Into<String>) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme: BoardTheme::default(),
            line_name: line_name.into(),
            platform: platform.into(),
        })
    }

    /// Create a terminal board with a custom theme
    pub fn with_theme(
        line_name: impl Into<String>,
        platform: impl Into<String>,
        theme: BoardTheme,
    ) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
            line_name: line_name.into(),
            platform: platform.into(),
        })
    }

    /// Render the header bar: platform number, line name, clock (helper for closure)
    fn render_header(
        frame: &mut Frame,
        area: Rect,
        state: &BoardState,
        theme: &BoardTheme,
        line_name: &str,
        platform: &str,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(10)].as_ref())
            .split(area);

        let place = Paragraph::new(format!(" {platform}  {line_name}")).style(theme.header);
        frame.render_widget(place, chunks[0]);

        let clock = Paragraph::new(Span::styled(state.clock_text.clone(), theme.clock));
        frame.render_widget(clock, chunks[1]);
    }

    /// Render the allocation table (helper for closure)
    fn render_table(frame: &mut Frame, area: Rect, state: &BoardState, theme: &BoardTheme) {
        let header = Row::new(
            ["", "type", "run", "arrival", "track", "destination"]
                .into_iter()
                .map(Cell::from),
        )
        .style(theme.column_heading);

        let rows = state.rows.iter().map(|row| {
            Row::new(vec![
                Cell::from(row.label.clone()),
                Cell::from(row.service_type.clone()).style(theme.service_style(&row.service_type)),
                Cell::from(row.index.clone()),
                Cell::from(row.countdown.clone()).style(theme.countdown),
                Cell::from(row.track.clone()),
                Cell::from(row.dir.clone()),
            ])
        });

        let widths = [
            Constraint::Length(19),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths).header(header).column_spacing(1);
        frame.render_widget(table, area);
    }

    /// Render the scrolling announcement strip (helper for closure)
    fn render_ticker(frame: &mut Frame, area: Rect, state: &BoardState, theme: &BoardTheme) {
        let strip = Paragraph::new(state.ticker_line()).style(theme.ticker);
        frame.render_widget(strip, area);
    }

    /// Render the status line (helper for closure)
    fn render_status(frame: &mut Frame, area: Rect, state: &BoardState, theme: &BoardTheme) {
        let status = Paragraph::new(state.status_text()).style(theme.status);
        frame.render_widget(status, area);
    }
}

impl BoardRenderer for TerminalBoard {
    fn render(&mut self, state: &BoardState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            // Extract fields before the closure to avoid borrowing issues
            let theme = &self.theme;
            let line_name = self.line_name.as_str();
            let platform = self.platform.as_str();

            terminal.draw(move |frame| {
                let size = frame.size();

                // Split screen: header, allocation table, ticker, status line
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints(
                        [
                            Constraint::Length(1),
                            Constraint::Min(0),
                            Constraint::Length(1),
                            Constraint::Length(1),
                        ]
                        .as_ref(),
                    )
                    .split(size);

                Self::render_header(frame, chunks[0], state, theme, line_name, platform);
                Self::render_table(frame, chunks[1], state, theme);
                Self::render_ticker(frame, chunks[2], state, theme);
                Self::render_status(frame, chunks[3], state, theme);
            })?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.terminal = None;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalBoard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_terminal_board_creation() {
        let board = TerminalBoard::new("Nagahashi Line", "1");
        assert!(board.is_ok());
        let board = board.unwrap();
        assert!(board.terminal.is_none());
        assert_eq!(board.line_name, "Nagahashi Line");
        assert_eq!(board.platform, "1");

        // Test with custom theme
        let board_with_theme =
            TerminalBoard::with_theme("Nagahashi Line", "1", BoardTheme::monochrome());
        assert!(board_with_theme.is_ok());
    }

    #[test]
    fn test_theme_integration() {
        let board = TerminalBoard::new("Nagahashi Line", "1").unwrap();
        assert_eq!(board.theme.header.bg, Some(Color::Blue));

        let mono = TerminalBoard::with_theme("Nagahashi Line", "1", BoardTheme::monochrome())
            .unwrap();
        assert_eq!(mono.theme.header.bg, Some(Color::White));
    }
}
