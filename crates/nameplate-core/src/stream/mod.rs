//! Stream output for OBS integration.
//!
//! Lobby names are written as plain text files that OBS text sources can
//! read for a live overlay:
//!
//! - `playersInLobby.txt`: every name, comma separated
//! - `p1Name.txt` / `p2Name.txt`: the first two players
//! - `players.json`: names with the time they were read

mod output;

pub use output::*;
