//! LED arbiter and runner
//!
//! The arbiter picks the indicator and button light every 0.2 time-units;
//! the runner plays the scheduled LED tasks at the hardware's own cadence.

use std::convert::Infallible;

use parking_lot::Mutex;
use tracing::debug;

use cuenode_core::{apply_decision, arbitrate, CueResult, IndicatorHardware, LedDecision};

use crate::{ButtonMonitor, NodeConfig, NodeStateMachine, ReadinessGate};

/// Decision interval, in time-units
pub const ARBITER_CYCLE_UNITS: f64 = 0.2;

#[derive(Debug, Default)]
pub struct LedArbiter {
    last: Mutex<Option<LedDecision>>,
}

impl LedArbiter {
    pub fn new() -> Self {
        LedArbiter::default()
    }

    /// Most recent decision
    pub fn last(&self) -> Option<LedDecision> {
        *self.last.lock()
    }

    /// Decide once and schedule the matching LED tasks
    pub fn cycle<H: IndicatorHardware>(
        &self,
        hw: &H,
        gate: &ReadinessGate,
        machine: &NodeStateMachine,
        button: &ButtonMonitor,
    ) -> LedDecision {
        let connected = gate.observe();
        hw.connected(connected);

        let (cue_state, node_state) = machine.led_inputs();
        let decision = arbitrate(connected, &cue_state, &node_state, button.just_pressed());
        apply_decision(hw, decision);

        let mut last = self.last.lock();
        if *last != Some(decision) {
            debug!(
                indicator = %decision.indicator,
                button = ?decision.button,
                "led decision changed"
            );
        }
        *last = Some(decision);
        decision
    }

    pub async fn run<H: IndicatorHardware>(
        &self,
        hw: &H,
        gate: &ReadinessGate,
        machine: &NodeStateMachine,
        button: &ButtonMonitor,
        config: &NodeConfig,
    ) -> CueResult<Infallible> {
        loop {
            self.cycle(hw, gate, machine, button);
            tokio::time::sleep(config.units(ARBITER_CYCLE_UNITS)).await;
        }
    }
}

/// Play one button-light task and one indicator task per hardware delay
pub async fn run_leds<H: IndicatorHardware>(hw: &H) -> CueResult<Infallible> {
    loop {
        hw.run_led_tasks().await?;
        tokio::time::sleep(hw.get_delay()).await;
    }
}
