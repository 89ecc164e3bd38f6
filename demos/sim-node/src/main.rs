//! Cue Node Simulator
//!
//! Runs a complete node against a scripted show:
//! - In-memory remote store driven by a show controller
//! - Simulated LED panel, button and 16x2 display
//! - JSON error log
//!
//! Usage: `sim-node [config.json]`

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use cuenode_core::{MacAddress, TextDisplay};
use cuenode_gpio::read_mac;
use cuenode_runtime::{init_logging, MemoryStore, NodeConfig};
use cuenode_test::{sim_node, stage_left_script, ShowController, SimNode};

const FALLBACK_MAC: &str = "b8:27:eb:00:00:01";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::from_json_file(path)?,
        None => NodeConfig {
            time_unit: Duration::from_millis(100),
            error_log: std::env::temp_dir().join("cuenode-sim-errors.json"),
            ..NodeConfig::default()
        },
    };
    init_logging(&config.log_filter, config.log_json)?;

    let mac = read_mac(&config.mac_interface).unwrap_or_else(|err| {
        warn!(interface = %config.mac_interface, %err, "using simulated MAC address");
        MacAddress::new(FALLBACK_MAC)
    });

    println!("Cue node simulator");
    println!("  MAC:       {}", mac);
    println!("  Time unit: {:?}", config.time_unit);
    println!("  Error log: {}", config.error_log.display());
    println!();

    let store = Arc::new(MemoryStore::new());
    let show = ShowController::new(store.clone(), config.datatypes);
    let node = sim_node(config.clone(), mac.clone(), store)?;
    let script = stage_left_script(&mac);

    tokio::select! {
        failure = node.run() => error!(%failure, "node stopped"),
        never = show.run_clock(config.units(1.0)) => match never {},
        never = watch_display(&node, &config) => match never {},
        result = show.play(&script, node.hardware().backend(), &config) => {
            result?;
            // let the last cue settle before reporting
            tokio::time::sleep(config.units(10.0)).await;
            info!("show finished");
        }
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    println!();
    println!("Published node records:");
    for record in show.node_records()? {
        println!(
            "  cue {:>4}  {:<18} node state {}",
            record.cue_number_text(),
            record.cue_state(),
            record.node_state()
        );
    }

    node.display().clear()?;
    Ok(())
}

/// Log the display contents whenever they change
async fn watch_display(node: &SimNode, config: &NodeConfig) -> Infallible {
    let mut shown = String::new();
    loop {
        let text = node.display().get();
        if text != shown {
            let [top, bottom] = node
                .display()
                .lcd()
                .map(|lcd| lcd.rows())
                .unwrap_or_default();
            info!(top = %top, bottom = %bottom, "display");
            shown = text;
        }
        tokio::time::sleep(config.units(0.5)).await;
    }
}
