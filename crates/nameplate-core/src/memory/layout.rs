//! Memory layout constants for the lobby player-name block
//!
//! ```text
//!  record i (i = 0..4), stride 0x60
//! ┌──────────────┬──────────────┬──────────────────────────┬─────────┐
//! │ +0x00 owner  │ +0x04 marker │ +0x08 name (32 bytes,    │  ...    │
//! │ id (LE u32)  │ 01 00 10 01  │ NUL terminated)          │         │
//! └──────────────┴──────────────┴──────────────────────────┴─────────┘
//! ```
//!
//! Only the record belonging to the local player carries the owner id in its
//! first word; the marker is present in every occupied slot.

/// Memory layout constants for one name record
pub mod record {
    /// Distance between two consecutive records
    pub const STRIDE: u64 = 96;

    /// Number of record slots in a lobby block
    pub const COUNT: usize = 4;

    /// Offset of the fixed marker within a record
    pub const MARKER: u64 = 4;

    /// Offset of the player name within a record
    pub const NAME: u64 = 8;

    /// Maximum size of the name field
    pub const NAME_SIZE: usize = 32;

    /// Fixed marker that precedes every player name
    pub const MARKER_BYTES: [u8; 4] = [0x01, 0x00, 0x10, 0x01];
}

/// Constants for the region scan
pub mod scan {
    /// Size of the window compared against the signature
    pub const CHUNK_SIZE: usize = 16;

    /// Size of each read issued while scanning a region.
    ///
    /// Must stay a multiple of [`CHUNK_SIZE`] so that no window straddles
    /// two reads.
    pub const READ_BLOCK_SIZE: usize = 64 * 1024;

    /// Number of records checked before the owner's record
    pub const MAX_BACKTRACK: u64 = super::record::COUNT as u64 - 1;

    /// Highest user-mode address on x64 Windows
    /// (`SYSTEM_INFO::lpMaximumApplicationAddress`).
    ///
    /// The last free region ends at the next 64 KiB boundary, and querying
    /// that address fails, so the walk must stop here.
    pub const MAX_USER_ADDRESS: u64 = 0x7FFF_FFFE_FFFF;
}

/// Timing constants for polling
pub mod timing {
    /// Interval between lobby polls (seconds)
    pub const POLL_INTERVAL_SECS: u64 = 5;

    /// Upper bound on one full address-space discovery (seconds)
    pub const SCAN_TIMEOUT_SECS: u64 = 60;
}
