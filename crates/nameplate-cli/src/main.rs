mod commands;
mod config;
mod input;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::hex_utils::parse_hex_address;
use crate::config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "nameplate")]
#[command(about = "Lobby player names for SF30th Anniversary Collection")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Game executable name (overrides the config file)
    #[arg(short, long, global = true, env = "NAMEPLATE_PROCESS")]
    process: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the lobby and write overlay files on change (default)
    Watch {
        /// Seconds between polls
        #[arg(short, long)]
        interval: Option<u64>,

        /// Directory for the overlay files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print changes without writing files
        #[arg(long)]
        no_files: bool,
    },
    /// Read the lobby once and exit
    Once {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the memory regions searched for the lobby block
    Regions {
        /// Attach by process id instead of name
        #[arg(long)]
        pid: Option<u32>,
    },
    /// Hexdump the four records of a lobby block
    DumpBlock {
        /// Block start address (hex)
        address: String,

        /// Attach by process id instead of name
        #[arg(long)]
        pid: Option<u32>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("nameplate={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(&args.config);
    if let Some(process) = args.process {
        config.process_name = process;
    }

    match args.command.unwrap_or(Command::Watch {
        interval: None,
        output: None,
        no_files: false,
    }) {
        Command::Watch {
            interval,
            output,
            no_files,
        } => {
            if let Some(interval) = interval {
                config.poll_interval_secs = interval;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            if no_files {
                config.write_files = false;
            }
            commands::watch::run(&config)
        }
        Command::Once { json } => commands::once::run(&config, json),
        Command::Regions { pid } => commands::regions::run(&config.process_name, pid),
        Command::DumpBlock { address, pid } => {
            let address = parse_hex_address(&address)?;
            commands::dump_block::run(&config.process_name, address, pid)
        }
    }
}
