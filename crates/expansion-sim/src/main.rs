//! Expansion Simulator
//!
//! Runs the expansion strategist against a generated (or loaded) world and
//! reports which sites the colony network claimed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use colony_state::{AutonomyLevel, SnapshotError, WorldSnapshot};
use strategist::{default_config_toml, Strategist, StrategistError};

mod setup;
mod sim;

use setup::WorldParams;
use sim::{SimEvent, SimParams, Simulation};

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "expansion-sim")]
#[command(about = "Runs the colony expansion strategist over a synthetic world")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,

    /// Strategist configuration (TOML); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from a JSON world snapshot instead of generating one
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Half-width of the generated map
    #[arg(long, default_value_t = 8)]
    radius: i32,

    /// Maximum number of owned sites
    #[arg(long, default_value_t = 6)]
    capacity: usize,

    /// Platform identifier of the generated world
    #[arg(long, default_value = "shard0")]
    platform: String,

    /// Autonomy level of the generated world
    #[arg(long, value_enum, default_value_t = Autonomy::Automatic)]
    autonomy: Autonomy,

    /// Ticks for an expansion operation to become a colony
    #[arg(long, default_value_t = 1500)]
    settle_delay: u64,

    /// Ticks between colony tier increases
    #[arg(long, default_value_t = 2000)]
    growth_interval: u64,

    /// Strategist memory file, read at start and written at the end
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Write the final world snapshot here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Autonomy {
    Manual,
    SemiAutomatic,
    Automatic,
}

impl From<Autonomy> for AutonomyLevel {
    fn from(value: Autonomy) -> Self {
        match value {
            Autonomy::Manual => AutonomyLevel::Manual,
            Autonomy::SemiAutomatic => AutonomyLevel::SemiAutomatic,
            Autonomy::Automatic => AutonomyLevel::Automatic,
        }
    }
}

/// Errors that end a run.
#[derive(Debug, Error)]
enum SimError {
    #[error("Strategist error: {0}")]
    Strategist(#[from] StrategistError),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strategist=info,expansion_sim=info".into()),
        )
        .init();

    let args = Args::parse();
    if args.print_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    println!("Expansion Simulator");
    println!("===================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Settle delay: {}", args.settle_delay);
    println!("Growth interval: {}", args.growth_interval);
    println!();

    let mut strategist = match &args.config {
        Some(path) => Strategist::from_config_file(path)?,
        None => Strategist::with_defaults(),
    };
    let stored = read_memory(args.memory.as_deref())?;
    strategist.refresh(stored.as_deref());

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let world = match &args.snapshot {
        Some(path) => {
            println!("Loading world from {}...", path.display());
            WorldSnapshot::from_file(path)?
        }
        None => {
            println!("Creating world map...");
            let params = WorldParams {
                radius: args.radius,
                platform_id: args.platform.clone(),
                capacity_limit: args.capacity,
                autonomy: args.autonomy.into(),
                ..WorldParams::default()
            };
            setup::create_world(&params, &mut rng)
        }
    };
    println!("  {} sites, {} colonies", world.sites.len(), world.colonies.len());
    println!();

    let params = SimParams {
        settle_delay: args.settle_delay,
        growth_interval: args.growth_interval,
    };
    let mut sim = Simulation::new(world, strategist, params, rng);
    let summary = sim.run(args.ticks);

    for event in sim.events() {
        println!("{}", describe(event));
    }

    println!();
    println!("Simulation complete!");
    println!("  Strategist checks: {}", summary.checks);
    println!("  Operations opened: {}", summary.operations_opened);
    println!("  Colonies settled: {}", summary.settled);
    println!("  Operations abandoned: {}", summary.abandoned);
    println!("  Colonies: {}", summary.colonies);
    println!("  Notifications: {}", summary.notifications);

    if let Some(path) = &args.memory {
        let saved = sim.strategist.save_memory()?;
        fs::write(path, saved).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
    }
    if let Some(path) = &args.output {
        sim.world.write_to(path)?;
        println!("  Final world written to {}", path.display());
    }

    Ok(())
}

/// Reads the memory blob; a missing file means a first run.
fn read_memory(path: Option<&Path>) -> Result<Option<String>, SimError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SimError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn describe(event: &SimEvent) -> String {
    match event {
        SimEvent::OperationOpened {
            tick,
            site,
            sponsor,
            score,
        } => format!("[{:>6}] {} opens expansion to {} (score {:.1})", tick, sponsor, site, score),
        SimEvent::Settled { tick, site, sponsor } => {
            format!("[{:>6}] {} settled by {}", tick, site, sponsor)
        }
        SimEvent::Abandoned { tick, site, sponsor } => {
            format!("[{:>6}] {} abandoned expansion to {}", tick, sponsor, site)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_state::SiteId;

    #[test]
    fn test_missing_memory_file_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        assert_eq!(read_memory(Some(path.as_path())).unwrap(), None);
        assert_eq!(read_memory(None).unwrap(), None);

        fs::write(&path, "{\"expansions_requested\":2}").unwrap();
        let raw = read_memory(Some(path.as_path())).unwrap();
        assert_eq!(raw.as_deref(), Some("{\"expansions_requested\":2}"));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["expansion-sim"]);
        assert_eq!(args.seed, 42);
        assert_eq!(args.radius, 8);
        assert!(matches!(args.autonomy, Autonomy::Automatic));
        assert!(args.output.is_none());

        let args = Args::parse_from(["expansion-sim", "--autonomy", "semi-automatic"]);
        assert_eq!(AutonomyLevel::from(args.autonomy), AutonomyLevel::SemiAutomatic);
    }

    #[test]
    fn test_describe_opened() {
        let line = describe(&SimEvent::OperationOpened {
            tick: 17,
            site: SiteId::new("E4S1"),
            sponsor: SiteId::new("E1S1"),
            score: 60.0,
        });
        assert_eq!(line, "[    17] E1S1 opens expansion to E4S1 (score 60.0)");
    }

    #[test]
    fn test_full_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let memory = dir.path().join("memory.json");
        let output = dir.path().join("world.json");
        let args = Args::parse_from([
            "expansion-sim",
            "--ticks",
            "5000",
            "--memory",
            memory.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]);

        run(&args).unwrap();

        let world = WorldSnapshot::from_file(&output).unwrap();
        assert_eq!(world.tick, 5000);
        assert!(fs::read_to_string(&memory)
            .unwrap()
            .contains("expansions_requested"));
    }
}
