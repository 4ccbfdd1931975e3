//! Signature scan for the lobby player-name block.
//!
//! # Search strategy
//!
//! The local player's record is tagged with an 8-byte signature built from
//! their account id. Every eligible region is scanned in parallel for that
//! signature, each hit is cross-checked against the owner's display name,
//! and the first verified hit is walked back to the first record of the
//! block.
//!
//! ```text
//!   region scan (16-byte windows)          backtrack (stride 96, max 3)
//! ┌──────────────────────────────┐      ┌─────────┬─────────┬─────────┐
//! │ .. [id|01 00 10 01|Owner] .. │ ───► │ P1 .. ◄─┤ P2 ◄────┤ Owner   │
//! └──────────────────────────────┘      └─────────┴─────────┴─────────┘
//! ```

mod cancel;
mod delimiter;
mod matcher;
mod orchestrator;
mod signature;

pub use cancel::CancelToken;
pub use delimiter::find_block_start;
pub use matcher::scan_region;
pub use orchestrator::{ScanOptions, discover};
pub use signature::Signature;
