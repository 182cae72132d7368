//! Board state: everything the renderer paints.
//!
//! One owner (the application runtime) mutates this; the feed and the timers
//! only reach it through that owner, which keeps snapshot replacement atomic
//! without locking.

use crate::alloc::{project, RenderedRow, Snapshot};
use crate::board::ticker::{Marquee, Ticker};
use crate::feed::protocol::ConnectionStatus;
use chrono::{DateTime, Local};

/// Clock readout before the first tick.
const CLOCK_PLACEHOLDER: &str = "--:--:--";

/// Render state for the departure board.
#[derive(Debug)]
pub struct BoardState {
    /// Latest snapshot from the feed. Replaced wholesale, never merged.
    snapshot: Snapshot,

    /// Countdown rows as of the last refresh tick. Derived data: regenerated
    /// from `snapshot` each tick, never carried across snapshots.
    pub rows: Vec<RenderedRow>,

    /// Connection status as reported by the feed service.
    pub status: ConnectionStatus,

    /// `HH:MM:SS` local wall time as of the last refresh tick.
    pub clock_text: String,

    /// Announcement rotation.
    pub ticker: Ticker,
    marquee: Marquee,

    /// Endpoint currently subscribed to (display only).
    pub endpoint: String,

    /// In-progress endpoint entry buffer, when the prompt is open.
    pub endpoint_entry: Option<String>,

    /// Terminal dimensions
    pub width: u16,
    pub height: u16,
}

impl BoardState {
    pub fn new(endpoint: String, announcements: Vec<String>, width: u16, height: u16) -> Self {
        let ticker = Ticker::new(announcements);
        let marquee = Marquee::new(width, ticker.current().chars().count());
        Self {
            snapshot: Snapshot::empty(),
            rows: Vec::new(),
            status: ConnectionStatus::Connecting,
            clock_text: CLOCK_PLACEHOLDER.to_string(),
            ticker,
            marquee,
            endpoint,
            endpoint_entry: None,
            width,
            height,
        }
    }

    /// Replace the held snapshot. Does not recompute rows: the redraw is
    /// tick-driven, which decouples network arrival rate from render rate.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// 1 Hz tick: recompute the countdown rows and the clock from `now`.
    pub fn refresh(&mut self, now: DateTime<Local>) {
        self.rows = project(&self.snapshot, now.timestamp_millis());
        self.clock_text = now.format("%H:%M:%S").to_string();
    }

    /// One marquee animation step. On cycle completion the ticker rotates
    /// and a fresh cycle starts for the new announcement.
    pub fn step_ticker(&mut self) {
        if self.marquee.step() {
            self.ticker.advance();
            self.marquee = Marquee::new(self.width, self.ticker.current().chars().count());
        }
    }

    /// The announcement strip at its current scroll position.
    pub fn ticker_line(&self) -> String {
        self.marquee.visible(self.ticker.current(), self.width)
    }

    /// Update terminal dimensions. Returns true if they actually changed;
    /// the marquee cycle restarts since its span depends on the width.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        let changed = self.width != width || self.height != height;
        if changed {
            self.width = width;
            self.height = height;
            self.marquee = Marquee::new(width, self.ticker.current().chars().count());
        }
        changed
    }

    /// Status line content: the endpoint prompt while editing, otherwise the
    /// connection status and subscribed endpoint.
    pub fn status_text(&self) -> String {
        if let Some(buffer) = &self.endpoint_entry {
            return format!("endpoint> {buffer}");
        }
        if self.endpoint.is_empty() {
            self.status.label()
        } else {
            format!("{} | {}", self.status.label(), self.endpoint)
        }
    }
}
