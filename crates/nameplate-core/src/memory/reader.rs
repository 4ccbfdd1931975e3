use crate::error::{Error, Result};
use crate::memory::MemoryRegion;

/// Synchronous access to the target process memory.
///
/// A failed read is always reported as an error, never as zeroed bytes.
pub trait ReadMemory: Sync {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    fn read_u64(&self, address: u64) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        let array: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::MemoryReadFailed {
                address,
                message: format!("short read ({} of 8 bytes)", bytes.len()),
            })?;
        Ok(u64::from_le_bytes(array))
    }
}

/// One OS page query: returns the region containing `address`.
pub trait QueryRegions {
    fn query_region(&self, address: u64) -> Result<MemoryRegion>;
}

/// Process identity and environment access.
pub trait ProcessEnvironment {
    fn pid(&self) -> u32;

    /// Read one environment variable of the target process.
    ///
    /// Returns `Ok(None)` when the variable is not set.
    fn read_environment(&self, key: &str) -> Result<Option<String>>;
}

/// Everything the scanner needs from a target process.
pub trait TargetProcess: ReadMemory + QueryRegions + ProcessEnvironment {}

impl<T: ReadMemory + QueryRegions + ProcessEnvironment> TargetProcess for T {}

/// Locates and opens the target process.
pub trait ProcessProvider {
    type Process: TargetProcess;

    fn find_process(&self) -> Result<Self::Process>;
}
