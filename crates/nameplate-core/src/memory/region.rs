//! Virtual address space enumeration.

use strum::Display;

use crate::error::Result;
use crate::memory::QueryRegions;

/// Page protection flags (subset of the Win32 `PAGE_*` values)
pub mod protection {
    pub const NOACCESS: u32 = 0x01;
    pub const READONLY: u32 = 0x02;
    pub const READWRITE: u32 = 0x04;
    pub const WRITECOPY: u32 = 0x08;
    pub const EXECUTE: u32 = 0x10;
    pub const EXECUTE_READ: u32 = 0x20;
    pub const EXECUTE_READWRITE: u32 = 0x40;
    pub const GUARD: u32 = 0x100;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MemoryState {
    #[strum(serialize = "MEM_COMMIT")]
    Commit,
    #[strum(serialize = "MEM_RESERVE")]
    Reserve,
    #[strum(serialize = "MEM_FREE")]
    Free,
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

impl MemoryState {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0x1000 => MemoryState::Commit,
            0x2000 => MemoryState::Reserve,
            0x10000 => MemoryState::Free,
            _ => MemoryState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RegionType {
    #[strum(serialize = "MEM_PRIVATE")]
    Private,
    #[strum(serialize = "MEM_MAPPED")]
    Mapped,
    #[strum(serialize = "MEM_IMAGE")]
    Image,
    #[strum(serialize = "NONE")]
    None,
}

impl RegionType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0x20000 => RegionType::Private,
            0x40000 => RegionType::Mapped,
            0x1000000 => RegionType::Image,
            _ => RegionType::None,
        }
    }
}

/// A contiguous range of virtual memory with uniform attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
    /// Raw `PAGE_*` protection flags
    pub protect: u32,
    pub state: MemoryState,
    pub kind: RegionType,
}

impl MemoryRegion {
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }

    /// Only committed, private, plain read-write pages can hold the lobby
    /// block. Any modifier bit (guard, no-cache) excludes the region.
    pub fn is_eligible(&self) -> bool {
        self.state == MemoryState::Commit
            && self.protect == protection::READWRITE
            && self.kind == RegionType::Private
    }
}

/// Walks the address space of a process one region at a time.
///
/// Starts at address 0 and advances to the end of each returned region.
/// Stops when the walk stalls, when the next address passes `max_address`,
/// or after the first query error (which is yielded once).
pub struct RegionWalker<'a, Q: QueryRegions + ?Sized> {
    query: &'a Q,
    next: u64,
    max_address: u64,
    done: bool,
}

impl<'a, Q: QueryRegions + ?Sized> RegionWalker<'a, Q> {
    pub fn new(query: &'a Q, max_address: u64) -> Self {
        Self {
            query,
            next: 0,
            max_address,
            done: false,
        }
    }

    /// Restrict the walk to regions that may contain the lobby block
    pub fn eligible(self) -> impl Iterator<Item = Result<MemoryRegion>> + 'a
    where
        Q: 'a,
    {
        self.filter(|region| region.as_ref().map_or(true, MemoryRegion::is_eligible))
    }
}

impl<Q: QueryRegions + ?Sized> Iterator for RegionWalker<'_, Q> {
    type Item = Result<MemoryRegion>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next > self.max_address {
            return None;
        }

        let region = match self.query.query_region(self.next) {
            Ok(region) => region,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let end = region.end();
        if end <= self.next {
            self.done = true;
            return None;
        }
        self.next = end;

        Some(Ok(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MockMemoryBuilder;
    use crate::memory::layout::scan;
    use crate::memory::mock::ADDRESS_LIMIT;

    #[test]
    fn test_eligibility_filter() {
        let region = MemoryRegion {
            base: 0x1000,
            size: 0x1000,
            protect: protection::READWRITE,
            state: MemoryState::Commit,
            kind: RegionType::Private,
        };
        assert!(region.is_eligible());

        assert!(
            !MemoryRegion {
                protect: protection::READWRITE | protection::GUARD,
                ..region
            }
            .is_eligible()
        );
        assert!(
            !MemoryRegion {
                protect: protection::READONLY,
                ..region
            }
            .is_eligible()
        );
        assert!(
            !MemoryRegion {
                state: MemoryState::Reserve,
                ..region
            }
            .is_eligible()
        );
        assert!(
            !MemoryRegion {
                kind: RegionType::Image,
                ..region
            }
            .is_eligible()
        );
    }

    #[test]
    fn test_raw_conversions() {
        assert_eq!(MemoryState::from_raw(0x1000), MemoryState::Commit);
        assert_eq!(MemoryState::from_raw(0x10000), MemoryState::Free);
        assert_eq!(MemoryState::from_raw(0x3), MemoryState::Unknown);
        assert_eq!(RegionType::from_raw(0x20000), RegionType::Private);
        assert_eq!(RegionType::from_raw(0x1000000), RegionType::Image);
        assert_eq!(MemoryState::Commit.to_string(), "MEM_COMMIT");
        assert_eq!(RegionType::Mapped.to_string(), "MEM_MAPPED");
    }

    #[test]
    fn test_walk_covers_whole_address_space() {
        let mock = MockMemoryBuilder::new()
            .private_region(0x10000, vec![0; 0x1000])
            .region(
                0x20000,
                vec![0; 0x2000],
                protection::READONLY,
                RegionType::Image,
            )
            .private_region(0x40000, vec![0; 0x1000])
            .build();

        let regions: Vec<MemoryRegion> = RegionWalker::new(&mock, scan::MAX_USER_ADDRESS)
            .collect::<Result<_>>()
            .unwrap();

        // Gaps are reported as free regions, so the walk is contiguous
        for pair in regions.windows(2) {
            assert_eq!(pair[0].end(), pair[1].base);
        }
        assert_eq!(regions[0].base, 0);

        let eligible: Vec<u64> = RegionWalker::new(&mock, scan::MAX_USER_ADDRESS)
            .eligible()
            .map(|r| r.unwrap().base)
            .collect();
        assert_eq!(eligible, vec![0x10000, 0x40000]);
    }

    #[test]
    fn test_walk_ends_at_top_of_user_space() {
        let mock = MockMemoryBuilder::new()
            .private_region(0x10000, vec![0; 0x1000])
            .build();

        let regions: Vec<MemoryRegion> = RegionWalker::new(&mock, scan::MAX_USER_ADDRESS)
            .collect::<Result<_>>()
            .unwrap();
        let last = regions.last().unwrap();
        assert_eq!(last.end(), ADDRESS_LIMIT);
        assert_eq!(last.state, MemoryState::Free);

        // One page past the limit, the trailing query fails
        let past_end: Vec<Result<MemoryRegion>> =
            RegionWalker::new(&mock, ADDRESS_LIMIT).collect();
        assert!(matches!(past_end.last(), Some(Err(Error::ScanFailed(_)))));
    }

    #[test]
    fn test_walk_stops_at_max_address() {
        let mock = MockMemoryBuilder::new()
            .private_region(0x10000, vec![0; 0x1000])
            .private_region(0x80000, vec![0; 0x1000])
            .build();

        let eligible: Vec<u64> = RegionWalker::new(&mock, 0x20000)
            .eligible()
            .map(|r| r.unwrap().base)
            .collect();
        assert_eq!(eligible, vec![0x10000]);
    }

    struct StallingQuery;

    impl QueryRegions for StallingQuery {
        fn query_region(&self, _address: u64) -> Result<MemoryRegion> {
            Ok(MemoryRegion {
                base: 0,
                size: 0,
                protect: protection::READWRITE,
                state: MemoryState::Commit,
                kind: RegionType::Private,
            })
        }
    }

    #[test]
    fn test_walk_stops_when_advance_stalls() {
        let count = RegionWalker::new(&StallingQuery, u64::MAX).count();
        assert_eq!(count, 0);
    }

    struct FailingQuery;

    impl QueryRegions for FailingQuery {
        fn query_region(&self, address: u64) -> Result<MemoryRegion> {
            Err(Error::ScanFailed(format!("VirtualQueryEx failed at {:#x}", address)))
        }
    }

    #[test]
    fn test_walk_yields_query_error_once() {
        let mut walker = RegionWalker::new(&FailingQuery, u64::MAX);
        assert!(matches!(walker.next(), Some(Err(Error::ScanFailed(_)))));
        assert!(walker.next().is_none());
    }
}
