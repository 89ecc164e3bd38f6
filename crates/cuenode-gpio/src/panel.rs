//! LED panel - indicator light, button light, and button input
//!
//! Arbitration only selects a pending task for each light. The tasks run
//! when the runtime calls [`IndicatorHardware::run_led_tasks`], one button
//! task and one screen task per call, at the panel's own cadence.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use cuenode_core::{CueResult, IndicatorHardware};

use crate::Brightness;

pub const STANDBY_COLOR: &str = "FFFF00";
pub const GO_COLOR: &str = "00FF00";
pub const DISCONNECTED_COLOR: &str = "FF0000";
pub const DEFAULT_COLOR: &str = "0000FF";

/// Raw outputs and input behind the panel
pub trait LedBackend {
    fn set_rgb(&self, color: Brightness) -> CueResult<()>;
    fn set_button_led(&self, on: bool) -> CueResult<()>;

    /// Edge-detected, sticky press flag
    fn button_pressed(&self) -> bool;
    fn reset_button(&self);

    /// Stop the outputs and release the button input
    fn shutdown(&self) -> CueResult<()>;
}

/// Pending task for the indicator light
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenTask {
    /// Reset to the default color
    Default,
    /// Set a color and hold it
    Solid(Brightness),
    /// Show a color for one delay, then the default color
    Blink(Brightness),
}

/// Pending task for the button light
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonTask {
    Set(bool),
    /// On for one delay, then off
    Blink,
}

#[derive(Debug)]
struct PanelState {
    screen: ScreenTask,
    button: ButtonTask,
    connected: bool,
}

/// Indicator collaborator over an [`LedBackend`]
pub struct LedPanel<B> {
    backend: B,
    default_color: Brightness,
    standby_color: Brightness,
    go_color: Brightness,
    disconnected_color: Brightness,
    delay: Duration,
    state: Mutex<PanelState>,
}

impl<B: LedBackend> LedPanel<B> {
    /// Create a panel showing `default_color` with the button light off
    pub fn new(backend: B, default_color: &str, delay: Duration) -> CueResult<Self> {
        let default_color = Brightness::from_hex(default_color)?;
        backend.set_rgb(default_color)?;
        backend.set_button_led(false)?;

        Ok(LedPanel {
            backend,
            default_color,
            standby_color: Brightness::from_hex(STANDBY_COLOR)?,
            go_color: Brightness::from_hex(GO_COLOR)?,
            disconnected_color: Brightness::from_hex(DISCONNECTED_COLOR)?,
            delay,
            state: Mutex::new(PanelState {
                screen: ScreenTask::Default,
                button: ButtonTask::Set(false),
                connected: false,
            }),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Tasks the next `run_led_tasks` call will run
    pub fn pending(&self) -> (ScreenTask, ButtonTask) {
        let state = self.state.lock();
        if state.connected {
            (state.screen, state.button)
        } else {
            (ScreenTask::Blink(self.disconnected_color), ButtonTask::Set(false))
        }
    }

    fn set_screen(&self, task: ScreenTask) {
        self.state.lock().screen = task;
    }

    fn set_button(&self, task: ButtonTask) {
        self.state.lock().button = task;
    }

    async fn run_screen(&self, task: ScreenTask) -> CueResult<()> {
        match task {
            ScreenTask::Default => self.backend.set_rgb(self.default_color),
            ScreenTask::Solid(color) => self.backend.set_rgb(color),
            ScreenTask::Blink(color) => {
                self.backend.set_rgb(color)?;
                tokio::time::sleep(self.delay).await;
                self.backend.set_rgb(self.default_color)
            }
        }
    }

    async fn run_button(&self, task: ButtonTask) -> CueResult<()> {
        match task {
            ButtonTask::Set(on) => self.backend.set_button_led(on),
            ButtonTask::Blink => {
                self.backend.set_button_led(true)?;
                tokio::time::sleep(self.delay).await;
                self.backend.set_button_led(false)
            }
        }
    }
}

impl<B: LedBackend> IndicatorHardware for LedPanel<B> {
    fn pressed(&self) -> bool {
        self.backend.button_pressed()
    }

    fn reset_button_pressed(&self) {
        self.backend.reset_button();
    }

    fn button_state(&self, on: bool) {
        self.set_button(ButtonTask::Set(on));
    }

    fn blink_button(&self) {
        self.set_button(ButtonTask::Blink);
    }

    fn standby(&self) {
        self.set_screen(ScreenTask::Solid(self.standby_color));
    }

    /// Blinking yellow marks a second standby queued behind the first
    fn multiple_standbys(&self) {
        self.set_screen(ScreenTask::Blink(self.standby_color));
    }

    /// Solid green; the blinking button is what asks for the press
    fn go(&self) {
        self.set_screen(ScreenTask::Solid(self.go_color));
    }

    fn default_screen(&self) {
        self.set_screen(ScreenTask::Default);
    }

    fn connected(&self, connected: bool) {
        let mut state = self.state.lock();
        if state.connected != connected {
            debug!(connected, "indicator connectivity changed");
        }
        state.connected = connected;
    }

    async fn run_led_tasks(&self) -> CueResult<()> {
        let (screen, button) = self.pending();
        tokio::try_join!(self.run_button(button), self.run_screen(screen))?;
        Ok(())
    }

    fn get_delay(&self) -> Duration {
        self.delay
    }

    fn cleanup(&self) -> CueResult<()> {
        self.backend.set_rgb(Brightness::OFF)?;
        self.backend.set_button_led(false)?;
        self.backend.shutdown()
    }
}
