//! MERRA-2 site profiler.
//!
//! Turns MERRA-2 ASCII grid dumps into per-site vertical profiles, monthly
//! statistics and layered-atmosphere model documents.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use merra_profiler::aggregate::aggregate;
use merra_profiler::archive::ProfileArchive;
use merra_profiler::config::{load_config, ProfilerConfig};
use merra_profiler::discover::discover;
use merra_profiler::pipeline::{compile, extract};
use merra_profiler::runner::ModelRunner;
use merra_profiler::shutdown::{spawn_ctrl_c_handler, StopSignal};

#[derive(Parser, Debug)]
#[command(name = "merra-profiler")]
#[command(about = "MERRA-2 grid dumps to site profiles and layered-atmosphere documents")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "MERRA_PROFILER_CONFIG", default_value = "config/profiler.yaml")]
    config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode dumps and store interpolated site profiles in the archive
    Extract,
    /// Write a model document per archived site, day and hour
    Compile {
        /// Do not run the model executable even if one is configured
        #[arg(long)]
        no_model: bool,
    },
    /// Reduce the archive to monthly mean, median and minimum
    Aggregate,
    /// Extract, aggregate and compile in one pass
    Run {
        /// Do not run the model executable even if one is configured
        #[arg(long)]
        no_model: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    // Initialize tracing
    let level_name = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let level = match level_name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(config = %args.config.display(), sites = config.sites.len(), "Starting MERRA-2 profiler");

    // Shutdown signal
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut stop = StopSignal::new(shutdown_tx.subscribe());
    spawn_ctrl_c_handler(shutdown_tx.clone());

    match args.command {
        Command::Extract => {
            run_extract(&config, &mut stop)?;
        }
        Command::Compile { no_model } => {
            let archive = ProfileArchive::load(&config.output.archive)?;
            run_compile(&config, &archive, no_model, &mut stop).await?;
        }
        Command::Aggregate => {
            let archive = ProfileArchive::load(&config.output.archive)?;
            aggregate(&archive).save(&config.output.statistics)?;
        }
        Command::Run { no_model } => {
            let archive = run_extract(&config, &mut stop)?;
            aggregate(&archive).save(&config.output.statistics)?;
            if !stop.is_requested() {
                run_compile(&config, &archive, no_model, &mut stop).await?;
            }
        }
    }

    info!(stopped = stop.is_requested(), "Profiler finished");
    Ok(())
}

fn run_extract(config: &ProfilerConfig, stop: &mut StopSignal) -> Result<ProfileArchive> {
    let files = discover(config)?;
    let mut archive = ProfileArchive::new();
    extract(config, &files, &mut archive, stop)?;
    archive.save(&config.output.archive)?;
    Ok(archive)
}

async fn run_compile(
    config: &ProfilerConfig,
    archive: &ProfileArchive,
    no_model: bool,
    stop: &mut StopSignal,
) -> Result<()> {
    let runner = match &config.model {
        Some(model) if !no_model => Some(ModelRunner::new(model)),
        _ => None,
    };
    compile(config, archive, &config.output.model_dir, runner.as_ref(), stop).await?;
    Ok(())
}
