//! Display messages and the priority latch
//!
//! The display shows a single message. A message is shown only if its
//! priority is at least the latched priority; showing it raises the latch.
//! The latch is lowered only by an explicit reset.

/// Characters per display row
pub const DISPLAY_COLUMNS: usize = 16;

/// Characters shown across both rows
pub const DISPLAY_CHARS: usize = 32;

/// Priority of the MAC address shown before setup
pub const PRIORITY_IDLE: u8 = 0;

/// Priority of setup and cue text
pub const PRIORITY_NORMAL: u8 = 1;

/// Priority of the terminal error message
pub const PRIORITY_ERROR: u8 = 2;

/// Text bounded to [`DISPLAY_CHARS`] with a priority
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    text: String,
    pub priority: u8,
}

impl DisplayMessage {
    /// Create a message, truncating to [`DISPLAY_CHARS`] characters
    pub fn new(text: &str, priority: u8) -> Self {
        DisplayMessage {
            text: text.chars().take(DISPLAY_CHARS).collect(),
            priority,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Split into the two fixed-width rows, padding with spaces
    pub fn rows(&self) -> [String; 2] {
        let row = |skip: usize| -> String {
            let mut row: String = self.text.chars().skip(skip).take(DISPLAY_COLUMNS).collect();
            while row.chars().count() < DISPLAY_COLUMNS {
                row.push(' ');
            }
            row
        };
        [row(0), row(DISPLAY_COLUMNS)]
    }
}

/// Priority latch guarding the display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayLatch {
    current: u8,
}

impl DisplayLatch {
    pub fn new() -> Self {
        DisplayLatch::default()
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// Whether a message of `priority` may be shown now
    pub fn admits(&self, priority: u8) -> bool {
        priority >= self.current
    }

    /// Admit a message, raising the latch to its priority.
    ///
    /// Returns false and leaves the latch alone when the priority is too low.
    pub fn admit(&mut self, priority: u8) -> bool {
        if !self.admits(priority) {
            return false;
        }
        self.current = priority;
        true
    }

    /// Set the latch directly, lowering it if needed
    pub fn reset(&mut self, priority: u8) {
        self.current = priority;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_message_truncated() {
        let msg = DisplayMessage::new(&"x".repeat(40), PRIORITY_NORMAL);
        assert_eq!(msg.text().len(), DISPLAY_CHARS);
    }

    #[test]
    fn test_rows_fixed_width() {
        let msg = DisplayMessage::new("Cue 12: Hold for the big reveal", PRIORITY_NORMAL);
        let [top, bottom] = msg.rows();
        assert_eq!(top, "Cue 12: Hold for");
        assert_eq!(bottom, " the big reveal ");

        let short = DisplayMessage::new("Hi", PRIORITY_IDLE);
        let [top, bottom] = short.rows();
        assert_eq!(top, format!("Hi{}", " ".repeat(14)));
        assert_eq!(bottom, " ".repeat(16));
    }

    #[test]
    fn test_latch_blocks_lower_priority() {
        let mut latch = DisplayLatch::new();
        assert!(latch.admit(PRIORITY_IDLE));
        assert!(latch.admit(PRIORITY_NORMAL));
        assert!(!latch.admit(PRIORITY_IDLE));
        assert!(latch.admit(PRIORITY_ERROR));
        assert!(!latch.admit(PRIORITY_NORMAL));

        latch.reset(PRIORITY_NORMAL);
        assert!(latch.admit(PRIORITY_NORMAL));
    }

    proptest! {
        #[test]
        fn prop_error_priority_sticks(calls in prop::collection::vec(0u8..=1, 0..30)) {
            let mut latch = DisplayLatch::new();
            prop_assert!(latch.admit(PRIORITY_ERROR));
            for p in calls {
                prop_assert!(!latch.admit(p));
                prop_assert_eq!(latch.current(), PRIORITY_ERROR);
            }
        }
    }
}
