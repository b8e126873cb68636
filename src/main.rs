use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use navsync::core::config::{self, CliOverrides, NavSyncConfig, ResolvedConfig};
use navsync::replay::{self, ReplayOptions};
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "navsync", about = "Replay navigation traces against headless hosts")]
struct Args {
    /// Log level ("off", "error", "warn", "info", "debug", "trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON trace and print the host report
    Replay {
        trace: PathBuf,
        /// Run as if the host had animations turned off
        #[arg(long)]
        no_animations: bool,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let cli = match &args.command {
        Command::Replay {
            no_animations, pretty, ..
        } => CliOverrides {
            log_level: args.log_level.clone(),
            animations: no_animations.then_some(false),
            pretty: pretty.then_some(true),
        },
        Command::Config => CliOverrides {
            log_level: args.log_level.clone(),
            ..Default::default()
        },
    };

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (NavSyncConfig::default(), Some(e)),
    };
    let resolved = config::resolve(&file_config, &cli);

    // Initialize file logger before anything worth logging happens
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }
    if let Some(e) = config_error {
        warn!("Falling back to default config: {}", e);
    }
    info!("navsync starting up");

    match args.command {
        Command::Replay { trace, .. } => run_replay(&trace, &resolved),
        Command::Config => {
            print_config(&resolved);
            ExitCode::SUCCESS
        }
    }
}

fn run_replay(path: &Path, resolved: &ResolvedConfig) -> ExitCode {
    let options = ReplayOptions {
        animations: resolved.animations,
    };
    let report = match replay::load_trace(path).and_then(|trace| replay::replay(&trace, &options)) {
        Ok(report) => report,
        Err(e) => {
            error!("Replay failed: {}", e);
            eprintln!("navsync: {e}");
            return ExitCode::FAILURE;
        }
    };

    let output = if resolved.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    match output {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("navsync: could not encode report: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_config(resolved: &ResolvedConfig) {
    match config::config_path() {
        Some(path) => println!("config file: {}", path.display()),
        None => println!("config file: <no home directory>"),
    }
    println!("log_level:   {}", resolved.log_level);
    println!("log_file:    {}", resolved.log_file.display());
    println!("animations:  {}", resolved.animations);
    println!("pretty:      {}", resolved.pretty);
}
