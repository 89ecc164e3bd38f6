//! Button monitor

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use cuenode_core::{CueResult, IndicatorHardware};

use crate::{NodeConfig, NodeStateMachine, SetupGroup};

/// Press sampling interval, in time-units
pub const BUTTON_POLL_UNITS: f64 = 0.01;

/// How long a press counts as "just pressed", in time-units
pub const JUST_PRESSED_UNITS: f64 = 4.0;

/// Turns hardware presses into change requests on the node machine
#[derive(Debug, Default)]
pub struct ButtonMonitor {
    just_pressed: AtomicBool,
}

impl ButtonMonitor {
    pub fn new() -> Self {
        ButtonMonitor::default()
    }

    pub fn just_pressed(&self) -> bool {
        self.just_pressed.load(Ordering::Acquire)
    }

    pub fn set_just_pressed(&self, value: bool) {
        self.just_pressed.store(value, Ordering::Release);
    }

    pub async fn run<H: IndicatorHardware>(
        &self,
        hw: &H,
        setup: &SetupGroup,
        machine: &NodeStateMachine,
        config: &NodeConfig,
    ) -> CueResult<Infallible> {
        setup.wait().await;

        loop {
            if machine.request_change_if(|| hw.pressed()) {
                info!("button pressed; change requested");
                self.set_just_pressed(true);
                tokio::time::sleep(config.units(JUST_PRESSED_UNITS)).await;
                self.set_just_pressed(false);
            }
            tokio::time::sleep(config.units(BUTTON_POLL_UNITS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, ReadinessGate};
    use cuenode_core::MacAddress;
    use cuenode_gpio::{LedPanel, SimulatedLeds};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_press_requests_change_and_pulses() {
        let store = MemoryStore::new();
        let config = NodeConfig::default();
        let gate = ReadinessGate::new();
        gate.record_clock(Some(json!("t0").into()));
        gate.record_clock(Some(json!("t1").into()));

        let mac = "b8:27:eb:00:00:01";
        let setup = SetupGroup::new(MacAddress::new(mac));
        store.publish(config.datatypes.attributes, json!({ mac: { "Cue Prefix": "SL" } }));
        store.publish(
            config.datatypes.cue_to_node,
            json!({ "Go": { "Initial Node State": "None", "Final Node State": "Go" } }),
        );
        setup.run(&store, &gate, &config).await.unwrap();

        let hw = LedPanel::new(SimulatedLeds::new(), "0000FF", Duration::from_secs(1)).unwrap();
        let machine = NodeStateMachine::new();
        let monitor = ButtonMonitor::new();

        let driver = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(!monitor.just_pressed());
            hw.backend().press();

            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(monitor.just_pressed());
            assert!(machine.flags().change_requested);

            tokio::time::sleep(Duration::from_secs(4)).await;
            assert!(!monitor.just_pressed());
        };

        tokio::select! {
            result = monitor.run(&hw, &setup, &machine, &config) => panic!("monitor stopped: {:?}", result),
            _ = driver => {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignores_press_before_setup() {
        let config = NodeConfig::default();
        let setup = SetupGroup::new(MacAddress::new("b8:27:eb:00:00:01"));
        let hw = LedPanel::new(SimulatedLeds::new(), "0000FF", Duration::from_secs(1)).unwrap();
        let machine = NodeStateMachine::new();
        let monitor = ButtonMonitor::new();
        hw.backend().press();

        tokio::select! {
            result = monitor.run(&hw, &setup, &machine, &config) => panic!("monitor stopped: {:?}", result),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }
        assert!(!machine.flags().change_requested);
        assert!(hw.pressed());
    }
}
