//! Collaborator contracts consumed by the node runtime
//!
//! The runtime never talks to pins, buses, or the network directly. It
//! drives these traits, and `cuenode-gpio` plus the runtime's in-memory
//! store provide implementations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{ButtonLight, CueResult, DatatypeId, IndicatorState, LedDecision};

/// Pull/publish access to the shared remote store
pub trait RemoteStore {
    /// Latest published value for a datatype, or `None` if nothing is published
    fn receive_data(&self, datatype: DatatypeId, singular: bool) -> CueResult<Option<Value>>;

    /// Publish a record under a datatype
    fn send_message(&self, record: &Value, datatype: DatatypeId) -> CueResult<()>;
}

/// Indicator light, button light, and button input
pub trait IndicatorHardware {
    /// Sticky flag set by a button press, cleared by [`reset_button_pressed`]
    ///
    /// [`reset_button_pressed`]: IndicatorHardware::reset_button_pressed
    fn pressed(&self) -> bool;
    fn reset_button_pressed(&self);

    fn button_state(&self, on: bool);
    fn blink_button(&self);

    fn standby(&self);
    fn multiple_standbys(&self);
    fn go(&self);
    fn default_screen(&self);

    /// Whether the node currently sees fresh data from the remote store
    fn connected(&self, connected: bool);

    /// Run one pending button-light task and one indicator task
    fn run_led_tasks(&self) -> impl Future<Output = CueResult<()>>;

    /// Cadence of the LED tasks
    fn get_delay(&self) -> Duration;

    fn cleanup(&self) -> CueResult<()>;
}

/// Single-message character display
pub trait TextDisplay {
    /// Show `text` if `priority` is at least the latched priority
    fn display_text(&self, text: &str, priority: u8) -> CueResult<()>;

    /// Reset the latched priority
    fn change_priority(&self, priority: u8);

    fn clear(&self) -> CueResult<()>;
}

/// Persistent store of fatal failure signatures
pub trait ErrorLog {
    /// Append a failure signature unless it is already recorded
    fn update(&self, signature: &str) -> CueResult<()>;
    fn get(&self) -> Vec<String>;
    fn clear(&self) -> CueResult<()>;
}

/// Schedule the LED tasks matching an arbitration decision
pub fn apply_decision<H: IndicatorHardware + ?Sized>(hw: &H, decision: LedDecision) {
    match decision.button {
        ButtonLight::Off => hw.button_state(false),
        ButtonLight::Solid => hw.button_state(true),
        ButtonLight::Blinking => hw.blink_button(),
    }

    match decision.indicator {
        IndicatorState::Default => hw.default_screen(),
        IndicatorState::Standby => hw.standby(),
        IndicatorState::MultipleStandbys => hw.multiple_standbys(),
        IndicatorState::Go => hw.go(),
        IndicatorState::Disconnected => hw.connected(false),
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    fn receive_data(&self, datatype: DatatypeId, singular: bool) -> CueResult<Option<Value>> {
        (**self).receive_data(datatype, singular)
    }

    fn send_message(&self, record: &Value, datatype: DatatypeId) -> CueResult<()> {
        (**self).send_message(record, datatype)
    }
}

impl<T: TextDisplay + ?Sized> TextDisplay for Arc<T> {
    fn display_text(&self, text: &str, priority: u8) -> CueResult<()> {
        (**self).display_text(text, priority)
    }

    fn change_priority(&self, priority: u8) {
        (**self).change_priority(priority)
    }

    fn clear(&self) -> CueResult<()> {
        (**self).clear()
    }
}

impl<T: ErrorLog + ?Sized> ErrorLog for Arc<T> {
    fn update(&self, signature: &str) -> CueResult<()> {
        (**self).update(signature)
    }

    fn get(&self) -> Vec<String> {
        (**self).get()
    }

    fn clear(&self) -> CueResult<()> {
        (**self).clear()
    }
}
