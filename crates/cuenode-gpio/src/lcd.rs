//! 16x2 character display with a priority latch

use parking_lot::Mutex;
use tracing::warn;

use cuenode_core::{CueResult, DisplayLatch, DisplayMessage, TextDisplay};

/// Character display controller behind the text display
pub trait CharLcd {
    /// Move the cursor to the top-left corner
    fn home(&self) -> CueResult<()>;
    /// Write one full row (0 or 1)
    fn write_row(&self, row: usize, text: &str) -> CueResult<()>;
    fn clear(&self) -> CueResult<()>;
}

#[derive(Debug, Default)]
struct LcdState {
    latch: DisplayLatch,
    message: String,
}

/// Text display collaborator.
///
/// A display that failed to initialise silently ignores all output.
pub struct LcdDisplay<C> {
    lcd: Option<C>,
    state: Mutex<LcdState>,
}

impl<C: CharLcd> LcdDisplay<C> {
    pub fn new(lcd: C) -> Self {
        LcdDisplay {
            lcd: Some(lcd),
            state: Mutex::new(LcdState::default()),
        }
    }

    /// A display that was never found
    pub fn unavailable() -> Self {
        LcdDisplay {
            lcd: None,
            state: Mutex::new(LcdState::default()),
        }
    }

    /// Open the display at the first bus address that works
    pub fn detect<F>(addresses: &[u8], mut open: F) -> Self
    where
        F: FnMut(u8) -> CueResult<C>,
    {
        for &address in addresses {
            match open(address) {
                Ok(lcd) => return LcdDisplay::new(lcd),
                Err(err) => warn!(address, %err, "display address did not respond"),
            }
        }
        warn!("no display found; text output disabled");
        LcdDisplay::unavailable()
    }

    pub fn is_available(&self) -> bool {
        self.lcd.is_some()
    }

    pub fn lcd(&self) -> Option<&C> {
        self.lcd.as_ref()
    }

    /// Last message shown
    pub fn get(&self) -> String {
        self.state.lock().message.clone()
    }

    pub fn priority(&self) -> u8 {
        self.state.lock().latch.current()
    }
}

impl<C: CharLcd> TextDisplay for LcdDisplay<C> {
    fn display_text(&self, text: &str, priority: u8) -> CueResult<()> {
        let Some(lcd) = self.lcd.as_ref() else {
            return Ok(());
        };

        let mut state = self.state.lock();
        if !state.latch.admits(priority) {
            return Ok(());
        }

        let message = DisplayMessage::new(text, priority);
        let [top, bottom] = message.rows();
        lcd.home()?;
        lcd.write_row(0, &top)?;
        lcd.write_row(1, &bottom)?;

        state.latch.admit(priority);
        state.message = message.text().to_string();
        Ok(())
    }

    fn change_priority(&self, priority: u8) {
        self.state.lock().latch.reset(priority);
    }

    fn clear(&self) -> CueResult<()> {
        match self.lcd.as_ref() {
            Some(lcd) => lcd.clear(),
            None => Ok(()),
        }
    }
}
