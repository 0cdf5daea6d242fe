//! Media Player State Machine
//!
//! This example demonstrates a hierarchical machine with parallel regions.
//!
//! Key concepts:
//! - Typed events via the events! macro
//! - A composite state whose regions progress independently
//! - AND-join: the composite completes only when every region finishes
//! - Observing every transition, including completion-chain hops
//!
//! Run with: cargo run --example media_player

use statecraft::builder::ChartBuilder;
use statecraft::events;
use statecraft::machine::Machine;
use statecraft::observe::{StateChange, StateObserver};
use std::sync::Arc;

events! {
    pub enum PlayerEvent {
        Insert,
        AudioReady,
        VideoReady,
        Play,
        Pause,
        Stop,
        Eject,
    }
}

struct ConsoleObserver;

impl StateObserver for ConsoleObserver {
    fn state_changed(&self, change: &StateChange) {
        println!(
            "  [{}] {} -> {}",
            change.machine_name, change.old_state_name, change.new_state_name
        );
    }
}

fn main() {
    println!("=== Media Player State Machine ===\n");

    let audio = ChartBuilder::new("Audio")
        .state("Decoding", |s| s.on("AudioReady", "Ready"))
        .final_state("Ready")
        .initial("Decoding");
    let video = ChartBuilder::new("Video")
        .state("Decoding", |s| s.on("VideoReady", "Ready"))
        .final_state("Ready")
        .initial("Decoding");

    let chart = ChartBuilder::new("Player")
        .state("Empty", |s| s.on("Insert", "Loading"))
        .composite("Loading", [audio, video], |s| s.on_completion("Stopped"))
        .state("Stopped", |s| s.on("Play", "Playing").on("Eject", "Empty"))
        .state("Playing", |s| s.on("Pause", "Paused").on("Stop", "Stopped"))
        .state("Paused", |s| s.on("Play", "Playing").on("Stop", "Stopped"))
        .initial("Empty")
        .build()
        .expect("player chart is well formed");

    let mut player = Machine::with_observers(chart, vec![Arc::new(ConsoleObserver)]);
    println!("Initial state: {}\n", player.current_state().name());

    println!("Inserting a disc spawns the two loading regions:");
    player.trigger(&PlayerEvent::Insert);
    for region in player.regions() {
        println!("  region {} at {}", region.path(), region.current_state().name());
    }

    println!("\nAudio finishes first - the player keeps loading:");
    player.trigger(&PlayerEvent::AudioReady);
    println!("  player is at {}", player.current_state().name());

    println!("\nVideo finishes - the AND-join completes Loading:");
    player.trigger(&PlayerEvent::VideoReady);
    println!("  player is at {}", player.current_state().name());

    println!("\nNormal playback control:");
    player.trigger(&PlayerEvent::Play);
    player.trigger(&PlayerEvent::Pause);
    player.trigger(&PlayerEvent::Play);
    player.trigger(&PlayerEvent::Stop);

    println!("\nUnknown or mistimed events are ignored:");
    let handled = player.trigger(&PlayerEvent::Pause);
    println!("  Pause while Stopped handled: {handled}");

    player.trigger(&PlayerEvent::Eject);
    println!("\nFinal state: {}", player.current_state().name());

    println!("\n=== Example Complete ===");
}
