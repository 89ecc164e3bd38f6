//! Task orchestrator
//!
//! Runs every node loop on one task and owns the terminal shutdown path.

use std::convert::Infallible;

use thiserror::Error;
use tracing::{error, info, warn};

use cuenode_core::{
    CueError, ErrorLog, IndicatorHardware, MacAddress, RemoteStore, TextDisplay, PRIORITY_ERROR,
};

use crate::{
    run_leds, ButtonMonitor, CueTracker, DisplayPresenter, LedArbiter, NodeConfig,
    NodeStateMachine, ReadinessGate, SetupGroup,
};

/// Shown on the display after a fatal failure
pub const ERROR_MESSAGE: &str = "An error has occurred: check log";

/// Wait between reporting a fatal failure and hardware cleanup, in time-units
pub const FATAL_HOLD_UNITS: f64 = 10.0;

/// A node loop that stopped with an error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{task} task failed: {source}")]
pub struct TaskFailure {
    pub task: &'static str,
    pub source: CueError,
}

impl TaskFailure {
    pub fn new(task: &'static str, source: CueError) -> Self {
        TaskFailure { task, source }
    }

    /// Deduplication key for the error log
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

/// A complete cue node over its collaborators
pub struct CueNode<S, H, D, L> {
    config: NodeConfig,
    store: S,
    hw: H,
    display: D,
    errors: L,
    gate: ReadinessGate,
    setup: SetupGroup,
    tracker: CueTracker,
    machine: NodeStateMachine,
    presenter: DisplayPresenter,
    arbiter: LedArbiter,
    button: ButtonMonitor,
}

impl<S, H, D, L> CueNode<S, H, D, L>
where
    S: RemoteStore,
    H: IndicatorHardware,
    D: TextDisplay,
    L: ErrorLog,
{
    pub fn new(config: NodeConfig, mac: MacAddress, store: S, hw: H, display: D, errors: L) -> Self {
        CueNode {
            config,
            store,
            hw,
            display,
            errors,
            gate: ReadinessGate::new(),
            setup: SetupGroup::new(mac),
            tracker: CueTracker::new(),
            machine: NodeStateMachine::new(),
            presenter: DisplayPresenter::new(),
            arbiter: LedArbiter::new(),
            button: ButtonMonitor::new(),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn errors(&self) -> &L {
        &self.errors
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn setup(&self) -> &SetupGroup {
        &self.setup
    }

    pub fn tracker(&self) -> &CueTracker {
        &self.tracker
    }

    pub fn machine(&self) -> &NodeStateMachine {
        &self.machine
    }

    pub fn arbiter(&self) -> &LedArbiter {
        &self.arbiter
    }

    pub fn button(&self) -> &ButtonMonitor {
        &self.button
    }

    /// Run the node until a loop fails, then shut down.
    ///
    /// There is no restart: the returned failure is terminal.
    pub async fn run(&self) -> TaskFailure {
        info!(mac = %self.setup.attributes().mac(), "cue node starting");

        let failure = match self.run_tasks().await {
            Ok(never) => match never {},
            Err(failure) => failure,
        };
        self.shutdown(&failure).await;
        failure
    }

    async fn run_tasks(&self) -> Result<Infallible, TaskFailure> {
        let config = &self.config;

        let (never, ..) = tokio::try_join!(
            async {
                self.gate
                    .run(&self.store, config)
                    .await
                    .map_err(|e| TaskFailure::new("readiness", e))
            },
            async {
                self.setup
                    .run(&self.store, &self.gate, config)
                    .await
                    .map_err(|e| TaskFailure::new("setup", e))
            },
            async {
                self.tracker
                    .run(&self.store, &self.gate, &self.setup, config)
                    .await
                    .map_err(|e| TaskFailure::new("cue tracker", e))
            },
            async {
                self.machine
                    .run(&self.store, &self.hw, &self.gate, &self.setup, &self.tracker, config)
                    .await
                    .map_err(|e| TaskFailure::new("node state", e))
            },
            async {
                self.presenter
                    .run(&self.display, &self.setup, &self.machine, config)
                    .await
                    .map_err(|e| TaskFailure::new("display", e))
            },
            async {
                self.arbiter
                    .run(&self.hw, &self.gate, &self.machine, &self.button, config)
                    .await
                    .map_err(|e| TaskFailure::new("led arbiter", e))
            },
            async {
                run_leds(&self.hw)
                    .await
                    .map_err(|e| TaskFailure::new("led runner", e))
            },
            async {
                self.button
                    .run(&self.hw, &self.setup, &self.machine, config)
                    .await
                    .map_err(|e| TaskFailure::new("button", e))
            },
        )?;

        match never {}
    }

    async fn shutdown(&self, failure: &TaskFailure) {
        error!(task = failure.task, error = %failure.source, "fatal failure, shutting down");

        if let Err(err) = self.errors.update(&failure.signature()) {
            warn!(%err, "could not record failure");
        }
        if let Err(err) = self.display.display_text(ERROR_MESSAGE, PRIORITY_ERROR) {
            warn!(%err, "could not show error message");
        }

        tokio::time::sleep(self.config.units(FATAL_HOLD_UNITS)).await;

        if let Err(err) = self.hw.cleanup() {
            warn!(%err, "hardware cleanup failed");
        }
        if let Err(err) = self.display.clear() {
            warn!(%err, "display clear failed");
        }
        info!("cue node stopped");
    }
}
