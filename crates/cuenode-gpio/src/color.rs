//! Hex colors and PWM brightness

use cuenode_core::{CueError, CueResult};

/// Per-channel PWM duty cycle in percent (0..=100)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Brightness {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Brightness {
    pub const OFF: Brightness = Brightness {
        red: 0,
        green: 0,
        blue: 0,
    };

    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Brightness { red, green, blue }
    }

    /// Convert an `RRGGBB` hex string.
    ///
    /// Each byte maps to `byte / 2.55` percent, truncated.
    pub fn from_hex(hex: &str) -> CueResult<Self> {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CueError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| -> CueResult<u8> {
            let byte = u8::from_str_radix(&hex[range], 16)
                .map_err(|e| CueError::InvalidColor(format!("{hex}: {e}")))?;
            Ok((byte as u16 * 100 / 255) as u8)
        };

        Ok(Brightness {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }

    pub fn as_tuple(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}
