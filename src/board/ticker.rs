//! Rotating announcement strip.
//!
//! The announcement list is fixed and cyclic. The visible strip is a marquee
//! that scrolls one column per animation step; the ticker only advances to
//! the next announcement when a full marquee cycle completes, so the
//! animation's own duration governs the rotation cadence, never the
//! 1-second clock timer.

/// Built-in announcement rotation.
pub fn default_announcements() -> Vec<String> {
    [
        "The tactile paving is a vital guide for visually impaired passengers. \
         Please do not stand or place baggage on the tiles.",
        "If a train remains stopped for an extended time, please notify station staff.",
        "For passengers sensitive to air conditioning, mildly air-conditioned cars \
         will be introduced on the Nagahashi Line from mid-June.",
        "When someone needs assistance in the station, a kind word from you builds \
         a brighter community. Thank you for your understanding and cooperation.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Fixed cyclic list of announcement strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    messages: Vec<String>,
    index: usize,
}

impl Ticker {
    pub fn new(messages: Vec<String>) -> Self {
        let messages = if messages.is_empty() {
            vec![String::new()]
        } else {
            messages
        };
        Self { messages, index: 0 }
    }

    pub fn current(&self) -> &str {
        &self.messages[self.index]
    }

    /// Next announcement, wrapping to the first after the last.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.messages.len();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(default_announcements())
    }
}

/// Horizontal scroll state for the announcement strip.
///
/// A cycle starts with the text just past the right edge of the viewport and
/// completes once the last character has left the left edge; `step` reports
/// the completion so the caller can rotate the announcement and start the
/// next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marquee {
    position: u32,
    span: u32,
}

impl Marquee {
    pub fn new(viewport: u16, text_cols: usize) -> Self {
        Self {
            position: 0,
            span: (viewport as u32 + text_cols as u32).max(1),
        }
    }

    /// Advance one column. Returns true when this step completed the cycle.
    pub fn step(&mut self) -> bool {
        self.position += 1;
        if self.position >= self.span {
            self.position = 0;
            true
        } else {
            false
        }
    }

    /// The strip contents at the current scroll position, exactly `viewport`
    /// columns of context: leading gap while the text slides in from the
    /// right, then the text sliding out across the left edge.
    pub fn visible(&self, text: &str, viewport: u16) -> String {
        let viewport = viewport as i64;
        let lead = viewport - self.position as i64;

        let mut strip = String::new();
        if lead > 0 {
            strip.extend(std::iter::repeat(' ').take(lead as usize));
            strip.extend(text.chars().take((viewport - lead) as usize));
        } else {
            strip.extend(text.chars().skip((-lead) as usize).take(viewport as usize));
        }
        strip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(n: usize) -> Ticker {
        Ticker::new((0..n).map(|i| format!("announcement {i}")).collect())
    }

    #[test]
    fn test_ticker_cycles_through_all_messages() {
        let mut t = ticker(4);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(t.current().to_string());
            t.advance();
        }
        assert_eq!(t.index(), 0, "wraps to the first after the last");
        assert_eq!(seen.len(), 4);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 4, "every announcement shown before repeating");
    }

    #[test]
    fn test_empty_ticker_is_safe() {
        let mut t = Ticker::new(Vec::new());
        assert_eq!(t.current(), "");
        t.advance();
        assert_eq!(t.current(), "");
    }

    #[test]
    fn test_marquee_completes_after_full_traversal() {
        let mut m = Marquee::new(10, 5);
        let mut completions = 0;
        for _ in 0..15 {
            if m.step() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1, "one cycle per viewport+text columns");
    }

    #[test]
    fn test_marquee_visible_slides_right_to_left() {
        let mut m = Marquee::new(6, 3);

        // Cycle start: the text is entirely off the right edge.
        assert_eq!(m.visible("abc", 6), "      ");

        m.step();
        assert_eq!(m.visible("abc", 6), "     a");

        for _ in 0..4 {
            m.step();
        }
        assert_eq!(m.visible("abc", 6), " abc");

        // Position 8 of 9: only the tail remains at the left edge.
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.visible("abc", 6), "c");
    }

    #[test]
    fn test_default_announcements_nonempty() {
        let announcements = default_announcements();
        assert_eq!(announcements.len(), 4);
        assert!(announcements.iter().all(|a| !a.is_empty()));
    }
}
