//! Readiness gate
//!
//! Turns "the remote clock changed since the last poll" into a broadcast,
//! resettable readiness signal. Readiness is a freshness pulse, not a
//! connectivity flag: a single poll without a clock change drops it again,
//! and everything waiting on it blocks until the next change.

use std::convert::Infallible;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use cuenode_core::{CueResult, RemoteClock, RemoteStore};

use crate::NodeConfig;

/// Poll interval after a clock change, in time-units
pub const SLOW_POLL_UNITS: f64 = 5.0;

/// Poll interval while no change is seen, in time-units
pub const FAST_POLL_UNITS: f64 = 0.25;

/// Snapshot of the readiness signal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    pub ready: bool,
    /// Bumped on every ready → not-ready transition
    pub generation: u64,
}

/// Tracks the last distinct remote clock value
#[derive(Clone, Debug, Default)]
pub struct ClockWatch {
    last: Option<RemoteClock>,
    primed: bool,
}

impl ClockWatch {
    pub fn new() -> Self {
        ClockWatch::default()
    }

    /// Record a poll; true if the clock is present and differs from the
    /// previous value. The first poll only establishes the baseline.
    pub fn observe(&mut self, current: Option<RemoteClock>) -> bool {
        if !self.primed {
            self.primed = true;
            self.last = current;
            return false;
        }

        match current {
            Some(clock) if self.last.as_ref() != Some(&clock) => {
                self.last = Some(clock);
                true
            }
            _ => false,
        }
    }

    pub fn last(&self) -> Option<&RemoteClock> {
        self.last.as_ref()
    }
}

/// Broadcast readiness signal driven by remote clock polls
#[derive(Debug)]
pub struct ReadinessGate {
    state: watch::Sender<Readiness>,
    clock: Mutex<ClockWatch>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Readiness::default());
        ReadinessGate {
            state,
            clock: Mutex::new(ClockWatch::new()),
        }
    }

    /// Non-blocking: whether the gate is ready right now
    pub fn observe(&self) -> bool {
        self.state.borrow().ready
    }

    pub fn readiness(&self) -> Readiness {
        *self.state.borrow()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Last distinct clock value seen
    pub fn last_clock(&self) -> Option<RemoteClock> {
        self.clock.lock().last().cloned()
    }

    /// Suspend until the gate is ready.
    ///
    /// Returns at once if it already is. Otherwise waits for the current
    /// generation to become ready; every waiter is released together.
    pub async fn await_ready(&self) {
        let mut rx = self.state.subscribe();
        // `self` holds the sender, so the channel stays open while we wait
        rx.wait_for(|r| r.ready).await.ok();
    }

    /// Producer side: apply the outcome of one poll
    pub fn pulse(&self, changed: bool) -> bool {
        self.state.send_if_modified(|r| {
            if changed && !r.ready {
                r.ready = true;
                debug!(generation = r.generation, "remote data fresh");
                true
            } else if !changed && r.ready {
                r.ready = false;
                r.generation += 1;
                debug!(generation = r.generation, "remote data stale");
                true
            } else {
                false
            }
        });
        self.observe()
    }

    /// Feed one clock read through the watch and the signal; returns
    /// whether the clock changed
    pub fn record_clock(&self, current: Option<RemoteClock>) -> bool {
        let changed = self.clock.lock().observe(current);
        self.pulse(changed);
        changed
    }

    /// Poll the remote clock for the node's lifetime
    pub async fn run<S: RemoteStore>(&self, store: &S, config: &NodeConfig) -> CueResult<Infallible> {
        loop {
            let current = store
                .receive_data(config.datatypes.online, true)?
                .map(RemoteClock::from);

            let changed = self.record_clock(current);
            let pause = if changed { SLOW_POLL_UNITS } else { FAST_POLL_UNITS };
            tokio::time::sleep(config.units(pause)).await;
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
