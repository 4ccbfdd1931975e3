//! In-memory simulated process for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::memory::layout::{record, scan};
use crate::memory::{
    MemoryRegion, MemoryState, ProcessEnvironment, ProcessProvider, QueryRegions, ReadMemory,
    RegionType, protection,
};

/// End of user space: the trailing free region stops here and queries at
/// or above it fail, like `VirtualQueryEx` on x64 Windows.
pub const ADDRESS_LIMIT: u64 = scan::MAX_USER_ADDRESS + 1;

struct MockRegion {
    region: MemoryRegion,
    data: Vec<u8>,
    readable: bool,
}

struct MockState {
    pid: u32,
    regions: RwLock<Vec<MockRegion>>,
    environment: HashMap<String, String>,
    attached: AtomicBool,
    fail_queries_from: Option<u64>,
    queries: AtomicUsize,
    reads: AtomicUsize,
}

/// Simulated target process backed by a sorted list of regions
#[derive(Clone)]
pub struct MockMemoryReader {
    inner: Arc<MockState>,
}

impl MockMemoryReader {
    /// Overwrite mapped bytes, e.g. to simulate the game moving the block
    pub fn write_bytes(&self, address: u64, bytes: &[u8]) {
        let mut regions = self.inner.regions.write().unwrap();
        let entry = regions
            .iter_mut()
            .find(|r| r.region.contains(address))
            .expect("write outside of mapped memory");
        let offset = (address - entry.region.base) as usize;
        entry.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Simulate the process exiting
    pub fn detach(&self) {
        self.inner.attached.store(false, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.inner.queries.store(0, Ordering::SeqCst);
        self.inner.reads.store(0, Ordering::SeqCst);
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.inner.reads.fetch_add(1, Ordering::Relaxed);

        let regions = self.inner.regions.read().unwrap();
        let end = address.saturating_add(size as u64);
        let entry = regions
            .iter()
            .find(|r| r.region.contains(address) && end <= r.region.end());

        match entry {
            Some(entry) if entry.readable => {
                let offset = (address - entry.region.base) as usize;
                Ok(entry.data[offset..offset + size].to_vec())
            }
            _ => Err(Error::MemoryReadFailed {
                address,
                message: "address not readable".to_string(),
            }),
        }
    }
}

impl QueryRegions for MockMemoryReader {
    fn query_region(&self, address: u64) -> Result<MemoryRegion> {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);

        let limit = self.inner.fail_queries_from.unwrap_or(ADDRESS_LIMIT);
        if address >= limit {
            return Err(Error::ScanFailed(format!("query failed at {:#x}", address)));
        }

        let regions = self.inner.regions.read().unwrap();
        if let Some(entry) = regions.iter().find(|r| r.region.contains(address)) {
            return Ok(entry.region);
        }

        let next_base = regions
            .iter()
            .map(|r| r.region.base)
            .filter(|&base| base > address)
            .min()
            .unwrap_or(ADDRESS_LIMIT);

        Ok(MemoryRegion {
            base: address,
            size: next_base - address,
            protect: protection::NOACCESS,
            state: MemoryState::Free,
            kind: RegionType::None,
        })
    }
}

impl ProcessEnvironment for MockMemoryReader {
    fn pid(&self) -> u32 {
        self.inner.pid
    }

    fn read_environment(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.environment.get(key).cloned())
    }
}

impl ProcessProvider for MockMemoryReader {
    type Process = MockMemoryReader;

    fn find_process(&self) -> Result<MockMemoryReader> {
        if self.inner.attached.load(Ordering::SeqCst) {
            Ok(self.clone())
        } else {
            Err(Error::ProcessNotFound("mock.exe".to_string()))
        }
    }
}

pub struct MockMemoryBuilder {
    pid: u32,
    regions: Vec<MockRegion>,
    environment: HashMap<String, String>,
    fail_queries_from: Option<u64>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self {
            pid: 1000,
            regions: Vec::new(),
            environment: HashMap::new(),
            fail_queries_from: None,
        }
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }

    /// Environment of a Steam-launched game for the given account
    pub fn steam_user(self, account_id: u32, name: &str) -> Self {
        let steam_id64 = crate::identity::STEAM_ID64_BASE + account_id as u64;
        self.env("STEAMID", &steam_id64.to_string())
            .env("SteamUser", name)
    }

    /// Committed, private, read-write region
    pub fn private_region(self, base: u64, data: Vec<u8>) -> Self {
        self.region(base, data, protection::READWRITE, RegionType::Private)
    }

    /// Committed region with the given attributes
    pub fn region(mut self, base: u64, data: Vec<u8>, protect: u32, kind: RegionType) -> Self {
        self.regions.push(MockRegion {
            region: MemoryRegion {
                base,
                size: data.len() as u64,
                protect,
                state: MemoryState::Commit,
                kind,
            },
            data,
            readable: true,
        });
        self
    }

    /// Eligible region whose reads always fail
    pub fn unreadable_region(mut self, base: u64, size: u64) -> Self {
        self.regions.push(MockRegion {
            region: MemoryRegion {
                base,
                size,
                protect: protection::READWRITE,
                state: MemoryState::Commit,
                kind: RegionType::Private,
            },
            data: Vec::new(),
            readable: false,
        });
        self
    }

    pub fn fail_queries_from(mut self, address: u64) -> Self {
        self.fail_queries_from = Some(address);
        self
    }

    pub fn build(mut self) -> MockMemoryReader {
        self.regions.sort_by_key(|r| r.region.base);
        MockMemoryReader {
            inner: Arc::new(MockState {
                pid: self.pid,
                regions: RwLock::new(self.regions),
                environment: self.environment,
                attached: AtomicBool::new(true),
                fail_queries_from: self.fail_queries_from,
                queries: AtomicUsize::new(0),
                reads: AtomicUsize::new(0),
            }),
        }
    }
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode one 96-byte lobby record.
///
/// `owner_id` goes into the first word; pass `None` for another player's slot.
pub fn lobby_record(owner_id: Option<u32>, name: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; record::STRIDE as usize];
    let id = owner_id.unwrap_or(0).to_le_bytes();
    bytes[..4].copy_from_slice(&id);
    bytes[4..8].copy_from_slice(&record::MARKER_BYTES);
    let name = name.as_bytes();
    bytes[8..8 + name.len()].copy_from_slice(name);
    bytes
}

/// Copy `bytes` into `image` at `offset`
pub fn place(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}
