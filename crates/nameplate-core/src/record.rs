//! Lobby record block decoding.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;
use crate::memory::layout::record;

/// Shortest accepted player name
pub const MIN_NAME_LEN: usize = 2;

/// Bytes allowed in a player name: `[A-Za-z0-9_\s]`
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b.is_ascii_whitespace()
}

/// Decode a NUL-terminated player name.
///
/// The name ends at the first NUL, or at the end of `raw` when there is none.
/// It must be 2 to 32 bytes long, use only `[A-Za-z0-9_\s]` and contain at
/// least one non-whitespace byte.
pub fn decode_name(raw: &[u8]) -> Result<String> {
    let len = memchr::memchr(0, raw).unwrap_or(raw.len());
    let bytes = &raw[..len];

    if len < MIN_NAME_LEN {
        return Err(Error::InvalidName(format!("too short ({} bytes)", len)));
    }
    if len > record::NAME_SIZE {
        return Err(Error::InvalidName(format!("too long ({} bytes)", len)));
    }
    if let Some(&b) = bytes.iter().find(|&&b| !is_name_byte(b)) {
        return Err(Error::InvalidName(format!("unexpected byte {:#04x}", b)));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::InvalidName("blank".to_string()));
    }

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Location of the lobby block: address of the first record's tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordBlock {
    start: u64,
}

impl RecordBlock {
    pub fn new(start: u64) -> Self {
        Self { start }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn record_address(&self, slot: usize) -> u64 {
        self.start + slot as u64 * record::STRIDE
    }

    pub fn name_address(&self, slot: usize) -> u64 {
        self.record_address(slot) + record::NAME
    }
}

/// Decoded content of the four record slots, in stride order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSlots {
    slots: [Option<String>; record::COUNT],
}

impl PlayerSlots {
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index)?.as_deref()
    }

    /// An empty first slot means the cached block no longer holds the lobby
    pub fn first_is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Occupied slots in order, empty ones removed
    pub fn names(&self) -> Vec<String> {
        self.slots.iter().flatten().cloned().collect()
    }
}

/// Read all record slots of a block.
///
/// A slot that cannot be read or does not decode to a valid name is empty.
pub fn read_block_names<R: ReadMemory + ?Sized>(reader: &R, block: RecordBlock) -> PlayerSlots {
    let mut slots = PlayerSlots::default();

    for (index, slot) in slots.slots.iter_mut().enumerate() {
        let address = block.name_address(index);
        let raw = match reader.read_bytes(address, record::NAME_SIZE) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("P{} name unreadable: {}", index + 1, e);
                continue;
            }
        };

        match decode_name(&raw) {
            Ok(name) => *slot = Some(name),
            Err(e) => trace!("P{} slot at {:#x} is empty: {}", index + 1, address, e),
        }
    }

    slots
}
