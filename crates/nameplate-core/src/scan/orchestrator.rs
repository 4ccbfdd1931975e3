//! Parallel discovery of the lobby block over the whole address space.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::memory::layout::{scan, timing};
use crate::memory::{MemoryRegion, QueryRegions, ReadMemory, RegionWalker};

use super::delimiter::find_block_start;
use super::matcher::scan_region;
use super::{CancelToken, Signature};

/// Tuning for one discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Highest address visited by the region walk
    pub max_address: u64,
    /// Number of worker threads (clamped to the number of regions)
    pub workers: usize,
    /// Give up after this long; `None` scans until the walk is exhausted
    pub timeout: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_address: scan::MAX_USER_ADDRESS,
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            timeout: Some(Duration::from_secs(timing::SCAN_TIMEOUT_SECS)),
        }
    }
}

/// Shared state of one discovery pass
struct Discovery<'a, R: ReadMemory + ?Sized> {
    reader: &'a R,
    regions: &'a [MemoryRegion],
    cursor: AtomicUsize,
    cancel: CancelToken,
    signature: &'a Signature,
    owner_name: &'a str,
    found: &'a AtomicU64,
}

impl<R: ReadMemory + ?Sized> Discovery<'_, R> {
    fn run_worker(&self) {
        while !self.cancel.is_cancelled() {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(region) = self.regions.get(index) else {
                break;
            };

            debug!(
                "Searching for player names in region [{:#x}-{:#x}]",
                region.base,
                region.end() - 1
            );

            let Some(owner_record) = scan_region(
                self.reader,
                region,
                self.signature,
                self.owner_name,
                &self.cancel,
            ) else {
                continue;
            };

            let block = find_block_start(self.reader, owner_record, region);
            info!("Address found: {:#x}", block.start());
            // Every worker would find the same block, so last writer wins
            self.found.store(block.start(), Ordering::SeqCst);
            self.cancel.cancel();
            break;
        }
    }
}

/// Search every eligible region for the lobby block.
///
/// Regions are enumerated first (a query failure aborts with `ScanFailed`),
/// then scanned by a pool of scoped workers. The first worker to validate a
/// match stores the block start in `found` and cancels the others. Returns
/// the value of `found` once every worker has finished (0 when nothing
/// matched).
pub fn discover<R: ReadMemory + QueryRegions + ?Sized>(
    reader: &R,
    signature: &Signature,
    owner_name: &str,
    options: &ScanOptions,
    found: &AtomicU64,
) -> Result<u64> {
    info!("Searching for memory address of player names...");
    let started = Instant::now();

    let regions = RegionWalker::new(reader, options.max_address)
        .eligible()
        .collect::<Result<Vec<_>>>()?;
    let total: u64 = regions.iter().map(|r| r.size).sum();
    debug!(
        "{} eligible regions ({} KB), signature {}",
        regions.len(),
        total / 1024,
        signature
    );

    let discovery = Discovery {
        reader,
        regions: &regions,
        cursor: AtomicUsize::new(0),
        cancel: CancelToken::new(options.timeout),
        signature,
        owner_name,
        found,
    };
    let workers = options.workers.clamp(1, regions.len().max(1));

    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| s.spawn(|| discovery.run_worker()))
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                error!("Region scan worker panicked");
            }
        }
    });

    let address = found.load(Ordering::SeqCst);
    debug!(
        "Discovery finished in {:.2}s ({} workers)",
        started.elapsed().as_secs_f64(),
        workers
    );

    if address == 0 && discovery.cancel.timed_out() {
        warn!("Scan deadline reached before the player names were found");
        return Err(Error::ScanTimedOut(options.timeout.unwrap_or_default()));
    }

    Ok(address)
}
