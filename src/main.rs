use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tactica::{logging, scenario::ScenarioLoader, GridController, LoggingObserver};

#[derive(Debug, Parser)]
#[command(author, version, about = "Tactical battle map generator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/skirmish.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override map width
    #[arg(long)]
    width: Option<i32>,

    /// Override map height
    #[arg(long)]
    height: Option<i32>,

    /// Log per-stage detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    tracing::subscriber::with_default(logging::subscriber(level), || run(cli))
}

fn run(cli: Cli) -> Result<()> {
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let width = cli.width.unwrap_or(scenario.width);
    let height = cli.height.unwrap_or(scenario.height);

    let span = tracing::info_span!("map", name = %scenario.name);
    let settings = scenario.settings(cli.seed).with_span(span.clone());
    let seed = settings.seed;
    let mut generator = scenario.build_generator(settings);
    let mut controller =
        GridController::generate(&mut generator, width, height, LoggingObserver, span)?;

    for unit in &scenario.units {
        if let Err(err) = controller.add_unit(unit.position(), &unit.name, unit.speed) {
            tracing::warn!(name = %unit.name, %err, "unit skipped");
        }
    }

    let queued = controller.start_round();
    let mut turn = 1;
    while let Some(unit) = controller.next_turn() {
        tracing::info!(turn, name = %unit.name, speed = unit.speed, "turn");
        turn += 1;
    }

    let roads = controller.map().roads();
    println!(
        "Map '{}' ({}x{}, seed {}) generated: {} road tiles, {}/{} key-point pairs connected, {} units in the first round.",
        scenario.name,
        width,
        height,
        seed,
        controller.grid().count(tactica::Terrain::Road),
        roads.connected_pairs.len(),
        roads.connected_pairs.len() + roads.unconnected_pairs.len(),
        queued
    );
    Ok(())
}
