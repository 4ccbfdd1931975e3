//! # nameplate-core
//!
//! Core library for reading lobby player names from
//! Street Fighter 30th Anniversary Collection.
//!
//! This crate provides:
//! - Windows process memory reading and region enumeration
//! - Owner identity from the game's Steam environment
//! - Signature scanning for the lobby name block
//! - Address caching and lobby change detection
//! - Overlay file output for OBS

pub mod error;
pub mod identity;
pub mod lobby;
pub mod memory;
pub mod record;
pub mod scan;
pub mod scanner;
pub mod stream;

pub use error::{Error, Result};
pub use identity::Identity;
pub use lobby::{LobbyTracker, LobbyUpdate};
pub use memory::{
    DEFAULT_PROCESS_NAME, MemoryRegion, ProcessFinder, ProcessHandle, ProcessProvider,
    QueryRegions, ReadMemory, RegionWalker,
};
pub use record::{PlayerSlots, RecordBlock, read_block_names};
pub use scan::{ScanOptions, Signature};
pub use scanner::{PlayerNameScanner, ScannerConfig, ScannerConfigBuilder};
pub use stream::LobbyOutput;
