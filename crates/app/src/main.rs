//! Command-line entry point: serve a simulator over HTTP or drive one
//! locally with a scripted policy.

mod drive;
mod serve;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use environment::{SimConfig, SimEnv};
use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use crate::drive::Policy;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless car simulator for policy training")]
struct Cli {
    /// JSON simulator config; defaults apply to anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding map files (overrides the config)
    #[arg(long, global = true)]
    maps_dir: Option<PathBuf>,

    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve one simulator instance over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: String,

        /// Map file path or name inside the maps directory
        #[arg(short, long, default_value = "Level1")]
        map: String,
    },
    /// Run episodes locally and print a JSON summary
    Drive {
        #[arg(short, long, default_value = "Level1")]
        map: String,

        #[arg(long, value_enum, default_value = "wander")]
        policy: Policy,

        #[arg(long, default_value = "1")]
        episodes: usize,

        /// Step budget per episode
        #[arg(long, default_value = "2000")]
        max_steps: usize,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(dir) = cli.maps_dir {
        config.maps_dir = dir;
    }

    match cli.command {
        Command::Serve { addr, map } => {
            let env = open_env(&map, config)?;
            serve::run(&addr, env)?;
        }
        Command::Drive {
            map,
            policy,
            episodes,
            max_steps,
            seed,
        } => {
            let mut env = open_env(&map, config)?;
            let summaries = drive::run(&mut env, policy, episodes, max_steps, seed)?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }
    Ok(())
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Opens `map` as a file path if one exists, otherwise from the catalog.
fn open_env(map: &str, config: SimConfig) -> environment::Result<SimEnv> {
    let env = if Path::new(map).is_file() {
        SimEnv::from_map_file(map, config)?
    } else {
        SimEnv::from_catalog(map, config)?
    };
    info!("Using map {:?}", env.map_name());
    Ok(env)
}
