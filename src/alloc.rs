//! Allocation data model and render projection.
//!
//! An allocation assigns a scheduled service run to a track, ready for
//! display. The feed replaces the full ordered list on every update; nothing
//! here is merged incrementally. The scheduled time is kept absolute (epoch
//! milliseconds) and only its *projection* into a countdown string changes as
//! the clock advances.

use crate::error::Result;
use serde::Deserialize;

/// A single service slot assignment as it arrives on the wire.
///
/// Field names follow the feed payload: `type`, `index`, `time`, `track`,
/// `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Allocation {
    /// Service class from a small closed vocabulary, e.g. "local",
    /// "express", "out-of-service".
    #[serde(rename = "type")]
    pub service_type: String,
    /// Opaque service/run number.
    pub index: String,
    /// Projected arrival/departure instant, epoch milliseconds.
    pub time: i64,
    /// Track/platform label.
    pub track: String,
    /// Destination label.
    pub dir: String,
}

/// The complete, order-sensitive list of current allocations.
///
/// Insertion order is display order: the first entries are the next
/// departures. Every inbound feed message replaces the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    allocations: Vec<Allocation>,
}

impl Snapshot {
    /// Empty snapshot used at startup, before the first feed message.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode a feed payload: a JSON array of allocation objects.
    pub fn parse(data: &str) -> Result<Self> {
        let allocations: Vec<Allocation> = serde_json::from_str(data)?;
        Ok(Self { allocations })
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

impl From<Vec<Allocation>> for Snapshot {
    fn from(allocations: Vec<Allocation>) -> Self {
        Self { allocations }
    }
}

/// One table row as displayed: an allocation with its scheduled time
/// projected into a countdown string. Regenerated every tick, never stored
/// across ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// Position label: "next departure", "following departure", then the
    /// 1-based position.
    pub label: String,
    pub service_type: String,
    pub index: String,
    /// "about N seconds", or empty once the allocation is past due.
    pub countdown: String,
    pub track: String,
    pub dir: String,
}

/// Countdown text for a scheduled instant, relative to `now` (both epoch
/// milliseconds). Whole seconds via a true floor, so one millisecond past due
/// already floors below zero and renders blank.
pub fn countdown_text(scheduled_ms: i64, now_ms: i64) -> String {
    let seconds = (scheduled_ms - now_ms).div_euclid(1000);
    if seconds < 0 {
        String::new()
    } else {
        format!("about {seconds} seconds")
    }
}

/// Display label for a row position (0-based input).
pub fn row_label(position: usize) -> String {
    match position {
        0 => "next departure".to_string(),
        1 => "following departure".to_string(),
        n => (n + 1).to_string(),
    }
}

/// Project a snapshot into displayable rows at instant `now_ms`.
///
/// Ordering is preserved verbatim; past-due entries are not filtered, they
/// stay visible with a blank countdown until the next snapshot supersedes
/// them.
pub fn project(snapshot: &Snapshot, now_ms: i64) -> Vec<RenderedRow> {
    snapshot
        .allocations()
        .iter()
        .enumerate()
        .map(|(i, alloc)| RenderedRow {
            label: row_label(i),
            service_type: alloc.service_type.clone(),
            index: alloc.index.clone(),
            countdown: countdown_text(alloc.time, now_ms),
            track: alloc.track.clone(),
            dir: alloc.dir.clone(),
        })
        .collect()
}
