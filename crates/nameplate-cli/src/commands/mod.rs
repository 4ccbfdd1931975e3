//! CLI command implementations.

pub mod dump_block;
pub mod hex_utils;
pub mod once;
pub mod regions;
pub mod watch;

use anyhow::Result;
use nameplate_core::ProcessHandle;
use owo_colors::OwoColorize;

/// Open the game by pid when given, otherwise by executable name
pub(crate) fn open_process(process_name: &str, pid: Option<u32>) -> Result<ProcessHandle> {
    let process = match pid {
        Some(pid) => ProcessHandle::open(pid)?,
        None => ProcessHandle::find_and_open(process_name)?,
    };
    Ok(process)
}

/// Print the lobby as a numbered player list
pub(crate) fn print_players(players: &[String]) {
    if players.is_empty() {
        println!("{}", "Lobby is empty".yellow());
        return;
    }

    for (index, name) in players.iter().enumerate() {
        println!("  {} {}", format!("P{}", index + 1).cyan().bold(), name);
    }
}
