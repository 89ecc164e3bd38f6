//! In-memory hardware backends for simulation and tests

use std::collections::VecDeque;

use parking_lot::Mutex;

use cuenode_core::{CueError, CueResult};

use crate::{Brightness, CharLcd, LedBackend};

/// Output change recorded by [`SimulatedLeds`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedEvent {
    Rgb(Brightness),
    Button(bool),
    Shutdown,
}

/// Most recent output changes kept by [`SimulatedLeds`]
pub const LED_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Default)]
struct LedState {
    rgb: Brightness,
    button_led: bool,
    pressed: bool,
    shut_down: bool,
    history: VecDeque<LedEvent>,
}

impl LedState {
    fn record(&mut self, event: LedEvent) {
        if self.history.len() == LED_HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }
}

/// LED backend that records its latest output changes
#[derive(Debug, Default)]
pub struct SimulatedLeds {
    state: Mutex<LedState>,
}

impl SimulatedLeds {
    pub fn new() -> Self {
        SimulatedLeds::default()
    }

    /// Simulate a debounced button press edge
    pub fn press(&self) {
        self.state.lock().pressed = true;
    }

    pub fn rgb(&self) -> Brightness {
        self.state.lock().rgb
    }

    pub fn button_led(&self) -> bool {
        self.state.lock().button_led
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    /// Output changes, oldest first, up to [`LED_HISTORY_LIMIT`]
    pub fn history(&self) -> Vec<LedEvent> {
        self.state.lock().history.iter().copied().collect()
    }
}

impl LedBackend for SimulatedLeds {
    fn set_rgb(&self, color: Brightness) -> CueResult<()> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(CueError::Hardware("PWM output stopped".to_string()));
        }
        state.rgb = color;
        state.record(LedEvent::Rgb(color));
        Ok(())
    }

    fn set_button_led(&self, on: bool) -> CueResult<()> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(CueError::Hardware("button output released".to_string()));
        }
        state.button_led = on;
        state.record(LedEvent::Button(on));
        Ok(())
    }

    fn button_pressed(&self) -> bool {
        self.state.lock().pressed
    }

    fn reset_button(&self) {
        self.state.lock().pressed = false;
    }

    fn shutdown(&self) -> CueResult<()> {
        let mut state = self.state.lock();
        state.shut_down = true;
        state.record(LedEvent::Shutdown);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LcdRows {
    rows: [String; 2],
    writes: usize,
}

/// Character display that keeps its two rows in memory
#[derive(Debug, Default)]
pub struct SimulatedLcd {
    state: Mutex<LcdRows>,
}

impl SimulatedLcd {
    pub fn new() -> Self {
        SimulatedLcd::default()
    }

    pub fn rows(&self) -> [String; 2] {
        self.state.lock().rows.clone()
    }

    /// Number of row writes since creation
    pub fn writes(&self) -> usize {
        self.state.lock().writes
    }
}

impl CharLcd for SimulatedLcd {
    fn home(&self) -> CueResult<()> {
        Ok(())
    }

    fn write_row(&self, row: usize, text: &str) -> CueResult<()> {
        let mut state = self.state.lock();
        let slot = state
            .rows
            .get_mut(row)
            .ok_or_else(|| CueError::Hardware(format!("display has no row {row}")))?;
        *slot = text.to_string();
        state.writes += 1;
        Ok(())
    }

    fn clear(&self) -> CueResult<()> {
        let mut state = self.state.lock();
        state.rows = [String::new(), String::new()];
        Ok(())
    }
}
