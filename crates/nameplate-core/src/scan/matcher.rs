//! Signature search within one memory region.

use tracing::{debug, trace};

use crate::memory::layout::{record, scan};
use crate::memory::{MemoryRegion, ReadMemory};
use crate::record::decode_name;

use super::{CancelToken, Signature};

/// A window is a candidate when it starts with the signature and the name
/// right after it is non-empty.
fn is_candidate(window: &[u8], signature: &Signature) -> bool {
    window.len() > Signature::LEN
        && window[..Signature::LEN] == signature.as_bytes()[..]
        && window[Signature::LEN] != 0
}

/// The 8-byte signature is not unique in process memory; only a record whose
/// name is the owner's display name is accepted.
fn owner_name_follows<R: ReadMemory + ?Sized>(reader: &R, address: u64, owner_name: &str) -> bool {
    match reader.read_bytes(address + record::NAME, record::NAME_SIZE) {
        Ok(raw) => decode_name(&raw).is_ok_and(|name| name == owner_name),
        Err(e) => {
            trace!("Failed to read name after signature at {:#x}: {}", address, e);
            false
        }
    }
}

/// Scan a region in 16-byte windows aligned to its base.
///
/// Returns the address of the owner's record. Unreadable read blocks are
/// skipped. Returns `None` as soon as `cancel` trips.
pub fn scan_region<R: ReadMemory + ?Sized>(
    reader: &R,
    region: &MemoryRegion,
    signature: &Signature,
    owner_name: &str,
    cancel: &CancelToken,
) -> Option<u64> {
    let end = region.end();
    let mut block_base = region.base;
    let mut failed_blocks = 0usize;

    while block_base < end {
        if cancel.check_deadline() {
            return None;
        }

        let len = (end - block_base).min(scan::READ_BLOCK_SIZE as u64) as usize;
        let buffer = match reader.read_bytes(block_base, len) {
            Ok(buffer) => buffer,
            Err(e) => {
                trace!("Skipping unreadable block: {}", e);
                failed_blocks += 1;
                block_base += len as u64;
                continue;
            }
        };

        for (index, window) in buffer.chunks_exact(scan::CHUNK_SIZE).enumerate() {
            if cancel.is_cancelled() {
                return None;
            }
            if !is_candidate(window, signature) {
                continue;
            }

            let address = block_base + (index * scan::CHUNK_SIZE) as u64;
            if owner_name_follows(reader, address, owner_name) {
                return Some(address);
            }
            debug!("Signature at {:#x} is not followed by the owner name", address);
        }

        block_base += len as u64;
    }

    if failed_blocks > 0 {
        debug!(
            "{} unreadable block(s) in region [{:#x}-{:#x}]",
            failed_blocks,
            region.base,
            end - 1
        );
    }

    None
}
