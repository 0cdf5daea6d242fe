//! Live Debug Streaming
//!
//! This example wires a machine to the debug adapter so every transition
//! streams to an external visualizer as newline-delimited JSON.
//!
//! Key concepts:
//! - Loading adapter configuration (file > environment > defaults)
//! - Attaching the DebugClient as an ordinary observer
//! - Dispatch keeps working when the visualizer is unreachable
//!
//! Point it at a listener, e.g. `nc -l 7071`, then:
//! Run with: cargo run --example live_debug

use statecraft::adapter::{Config, DebugClient};
use statecraft::builder::ChartBuilder;
use statecraft::core::Signal;
use statecraft::machine::Machine;
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=== Live Debug Streaming ===\n");

    let config = Config::load(None).expect("adapter configuration is valid");
    println!("Connecting to visualizer at {}:{}", config.host, config.port);

    let observers = match DebugClient::connect(&config) {
        Ok(client) => vec![Arc::new(client) as Arc<dyn statecraft::StateObserver>],
        Err(err) => {
            println!("No visualizer listening ({err}); running without streaming");
            Vec::new()
        }
    };

    let chart = ChartBuilder::new("Build")
        .state("Idle", |s| s.on("Start", "Fetching"))
        .state("Fetching", |s| s.on_completion("Compiling"))
        .state("Compiling", |s| s.on("Ok", "Done").on("Fail", "Broken"))
        .final_state("Done")
        .state("Broken", |s| s.on("Start", "Fetching"))
        .initial("Idle")
        .build()
        .expect("build chart is well formed");

    let mut machine = Machine::with_observers(chart, observers);

    for event in ["Start", "Fail", "Start", "Ok"] {
        machine.trigger(&Signal(event));
        println!("  {} -> {}", event, machine.current_state().name());
    }

    println!("\n=== Example Complete ===");
}
