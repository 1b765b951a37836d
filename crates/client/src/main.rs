//! `ctb`: runs count-time battles from RON scenarios.
//!
//! ```bash
//! ctb run scenarios/forest.ron --seed 42
//! ctb preview scenarios/forest.ron --depth 8
//! ```
//!
//! Scheduler settings come from an optional RON config file, then from `CTB_*`
//! environment variables (a `.env` file is loaded first).
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use battle_core::{AdvanceMode, BattlePhase, Subject};
use battle_runtime::{AutoCommandProvider, BattleRuntime, RuntimeConfig, Scenario};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ctb", version, about = "Count-time battle runner")]
struct Cli {
    /// RON runtime configuration, applied before `CTB_*` overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to `ctb.log` in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scenario to the end and print the report as JSON
    Run {
        scenario: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        /// Manual party members try to escape whenever it is offered
        #[arg(long)]
        flee: bool,
        /// Advance until someone is ready on every tick
        #[arg(long)]
        fast: bool,
    },
    /// Print the predicted turn order at the start of the battle
    Preview {
        scenario: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        depth: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_dir.as_deref())?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            scenario,
            seed,
            flee,
            fast,
        } => {
            let mut config = config;
            if fast {
                config.battle.advance_mode = AdvanceMode::UntilReady;
            }
            let provider = AutoCommandProvider { flee };
            let mut runtime = build(&scenario, config, seed)?.provider(provider).build()?;
            let report = runtime.run().await?;
            println!("{}", report.to_json_pretty()?);
        }
        Command::Preview {
            scenario,
            seed,
            depth,
        } => {
            let mut config = config;
            if let Some(depth) = depth {
                config.battle.preview_depth = depth;
            }
            let mut runtime = build(&scenario, config, seed)?.build()?;
            preview(&mut runtime).await?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let config = match path {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn build(
    scenario: &Path,
    config: RuntimeConfig,
    seed: Option<u64>,
) -> Result<battle_runtime::BattleRuntimeBuilder> {
    let scenario = Scenario::load(scenario)
        .with_context(|| format!("loading scenario {}", scenario.display()))?;
    let builder = BattleRuntime::builder().config(config).scenario(scenario);
    Ok(match seed {
        Some(seed) => builder.seed(seed),
        None => builder,
    })
}

async fn preview(runtime: &mut BattleRuntime) -> Result<()> {
    while runtime.session().phase() == BattlePhase::Start {
        runtime.step().await?;
    }
    let session = runtime.session();
    println!("seed {}", session.seed());
    for (index, subject) in session.preview().iter().enumerate() {
        let name = match subject {
            Subject::Combatant(id) => session
                .roster()
                .name(*id)
                .map_or_else(|| id.to_string(), str::to_string),
            Subject::Synthetic(_) => subject.to_string(),
        };
        println!("{:>2}. {name}", index + 1);
    }
    Ok(())
}
