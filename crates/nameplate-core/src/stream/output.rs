use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const PLAYERS_FILE: &str = "playersInLobby.txt";
pub const P1_FILE: &str = "p1Name.txt";
pub const P2_FILE: &str = "p2Name.txt";
pub const JSON_FILE: &str = "players.json";

/// Snapshot written to `players.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub players: Vec<String>,
    pub updated_at: DateTime<Local>,
}

impl LobbySnapshot {
    pub fn now(players: &[String]) -> Self {
        Self {
            players: players.to_vec(),
            updated_at: Local::now(),
        }
    }
}

pub struct LobbyOutput {
    enabled: bool,
    base_dir: PathBuf,
}

impl LobbyOutput {
    pub fn new(enabled: bool, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            base_dir: base_dir.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Write every overlay file for the given lobby.
    ///
    /// An empty lobby leaves the previous files in place.
    pub fn write_players(&self, players: &[String]) -> Result<()> {
        if !self.enabled || players.is_empty() {
            return Ok(());
        }

        self.write_file(PLAYERS_FILE, &players.join(", "))?;
        self.write_file(P1_FILE, players.first().map_or("", String::as_str))?;
        self.write_file(P2_FILE, players.get(1).map_or("", String::as_str))?;

        let json = serde_json::to_string_pretty(&LobbySnapshot::now(players))?;
        self.write_file(JSON_FILE, &json)?;

        debug!("Wrote {} player(s) to {}", players.len(), self.base_dir.display());
        Ok(())
    }

    fn write_file(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.base_dir.join(filename);
        fs::write(path, content)?;
        Ok(())
    }
}
