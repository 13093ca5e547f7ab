//! Demonstration harness: loads a boiler configuration and a canned
//! scenario, then drives `boilerd::Controller` through it one cycle at
//! a time, printing the mode and outbound batch after each.

use std::fs;
use std::path::PathBuf;

use boiler_api::{Config, Mailbox, OutboundSink};
use boilerd::scenario::ScenarioCycle;
use boilerd::Controller;
use clap::Parser;

/// Replays a scenario file against the boiler controller core.
#[derive(Parser, Debug)]
#[command(
    name = "boilerd",
    about = "Cyclic steam-boiler controller demonstration harness"
)]
struct Cli {
    /// Path to a TOML file describing the boiler's physical configuration.
    #[arg(long)]
    config: PathBuf,

    /// Path to a JSON array of per-cycle inbound readings.
    #[arg(long)]
    scenario: PathBuf,
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();

    let config_text = fs::read_to_string(&cli.config)
        .unwrap_or_else(|e| panic!("reading {}: {e}", cli.config.display()));
    let config: Config = toml::from_str(&config_text)
        .unwrap_or_else(|e| panic!("parsing {}: {e}", cli.config.display()));

    let scenario_text = fs::read_to_string(&cli.scenario)
        .unwrap_or_else(|e| panic!("reading {}: {e}", cli.scenario.display()));
    let cycles: Vec<ScenarioCycle> = serde_json::from_str(&scenario_text)
        .unwrap_or_else(|e| panic!("parsing {}: {e}", cli.scenario.display()));

    let mut controller =
        Controller::new(config).unwrap_or_else(|e| panic!("invalid configuration: {e}"));
    let mut sink = OutboundSink::new();

    for (n, cycle) in cycles.iter().enumerate() {
        let inbound = cycle
            .into_messages()
            .unwrap_or_else(|e| panic!("cycle {n} in {}: {e}", cli.scenario.display()));
        controller.clock(Mailbox::new(&inbound), &mut sink);

        println!("cycle {n}: mode={}", controller.status());
        for msg in sink.messages() {
            println!("  -> {msg}");
        }

        if controller.mode().is_terminal() {
            tracing::warn!("controller reached a terminal mode, stopping replay");
            break;
        }
    }
}
