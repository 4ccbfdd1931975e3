use std::fmt;

use crate::memory::layout::record;

/// 8-byte tag of the local player's lobby record:
/// little-endian owner id followed by the fixed record marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 8]);

impl Signature {
    pub const LEN: usize = 8;

    pub fn for_owner(owner_id: u32) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[..4].copy_from_slice(&owner_id.to_le_bytes());
        bytes[4..].copy_from_slice(&record::MARKER_BYTES);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self
            .0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&hex)
    }
}
