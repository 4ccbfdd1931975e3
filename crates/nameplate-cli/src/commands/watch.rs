//! Main polling mode.

use std::sync::Arc;

use anyhow::Result;
use nameplate_core::{
    LobbyOutput, LobbyTracker, LobbyUpdate, PlayerNameScanner, ProcessFinder,
};
use owo_colors::OwoColorize;
use tracing::{error, info};

use crate::config::Config;
use crate::input;
use crate::shutdown::ShutdownSignal;

use super::print_players;

/// Poll the lobby until the user quits, writing overlay files on change
pub fn run(config: &Config) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));

    info!("nameplate {}", env!("CARGO_PKG_VERSION"));
    if config.write_files {
        info!("Writing overlay files to {}", config.output_dir.display());
    }

    let finder = ProcessFinder::new(&config.process_name);
    let scanner = PlayerNameScanner::with_config(config.scanner_config());
    let output = LobbyOutput::new(config.write_files, &config.output_dir);
    let mut tracker = LobbyTracker::new();

    println!(
        "Waiting for {}... (Press Esc, q or Enter to quit)",
        config.process_name
    );

    while !shutdown.is_shutdown() {
        let names = scanner.read_player_names(&finder);

        if let LobbyUpdate::Changed(players) = tracker.update(names) {
            println!("{}", "Players updated".green().bold());
            print_players(&players);

            if let Err(e) = output.write_players(&players) {
                error!("Failed to write overlay files: {}", e);
            }
        }

        if shutdown.wait(config.poll_interval()) {
            break;
        }
    }

    info!("Stopped");
    Ok(())
}
