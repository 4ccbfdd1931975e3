//! Backtracking from the owner's record to the start of the lobby block.

use tracing::debug;

use crate::memory::layout::{record, scan};
use crate::memory::{MemoryRegion, ReadMemory};
use crate::record::{RecordBlock, decode_name};

/// Another player's record: fixed marker followed by a valid name
fn is_player_record<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> bool {
    let marker_ok = reader
        .read_bytes(address + record::MARKER, record::MARKER_BYTES.len())
        .is_ok_and(|marker| marker == record::MARKER_BYTES);
    if !marker_ok {
        return false;
    }

    reader
        .read_bytes(address + record::NAME, record::NAME_SIZE)
        .is_ok_and(|raw| decode_name(&raw).is_ok())
}

/// Find the first record of the block containing the owner's record.
///
/// Walks back one stride at a time, at most three records, and stops at the
/// first slot that is outside the region, lacks the marker or has no valid
/// name. When nothing before it validates, the owner is P1.
pub fn find_block_start<R: ReadMemory + ?Sized>(
    reader: &R,
    owner_record: u64,
    region: &MemoryRegion,
) -> RecordBlock {
    let mut start = owner_record;

    for step in 1..=scan::MAX_BACKTRACK {
        let Some(candidate) = owner_record.checked_sub(step * record::STRIDE) else {
            break;
        };
        if candidate < region.base || !is_player_record(reader, candidate) {
            break;
        }
        start = candidate;
    }

    debug!(
        "Owner record at {:#x} is P{}",
        owner_record,
        (owner_record - start) / record::STRIDE + 1
    );
    RecordBlock::new(start)
}
