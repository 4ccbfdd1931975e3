//! Poll-level entry point: process lookup, identity, address cache.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::memory::{ProcessProvider, TargetProcess};
use crate::record::{RecordBlock, read_block_names};
use crate::scan::{ScanOptions, Signature, discover};

/// Configuration for the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Highest address visited when enumerating regions
    pub max_address: u64,
    /// Number of region scan workers
    pub workers: usize,
    /// Deadline for one full discovery; `None` disables it
    pub scan_timeout: Option<Duration>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let scan = ScanOptions::default();
        Self {
            max_address: scan.max_address,
            workers: scan.workers,
            scan_timeout: scan.timeout,
        }
    }
}

impl ScannerConfig {
    pub fn builder() -> ScannerConfigBuilder {
        ScannerConfigBuilder::default()
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_address: self.max_address,
            workers: self.workers,
            timeout: self.scan_timeout,
        }
    }
}

/// Builder for ScannerConfig
#[derive(Debug, Clone, Default)]
pub struct ScannerConfigBuilder {
    max_address: Option<u64>,
    workers: Option<usize>,
    scan_timeout: Option<Option<Duration>>,
}

impl ScannerConfigBuilder {
    pub fn max_address(mut self, address: u64) -> Self {
        self.max_address = Some(address);
        self
    }

    /// Number of worker threads (at least one)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Pass `None` to scan without a deadline
    pub fn scan_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.scan_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ScannerConfig {
        let default = ScannerConfig::default();
        ScannerConfig {
            max_address: self.max_address.unwrap_or(default.max_address),
            workers: self.workers.unwrap_or(default.workers),
            scan_timeout: self.scan_timeout.unwrap_or(default.scan_timeout),
        }
    }
}

/// Identity and signature cached for one target process
#[derive(Debug, Clone)]
struct Session {
    pid: u32,
    identity: Identity,
    signature: Signature,
}

/// Clears the busy flag when the poll ends, even on early return
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Reads lobby player names from the game, one poll at a time.
///
/// The discovered block address is cached between polls and dropped when
/// the first record reads empty, so the next poll searches again.
pub struct PlayerNameScanner {
    config: ScannerConfig,
    busy: AtomicBool,
    /// Start of the record block, 0 when unknown
    block_address: AtomicU64,
    session: Mutex<Option<Session>>,
}

impl PlayerNameScanner {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        debug!(
            "Scanner config: max_address={:#x}, workers={}, timeout={:?}",
            config.max_address, config.workers, config.scan_timeout
        );
        Self {
            config,
            busy: AtomicBool::new(false),
            block_address: AtomicU64::new(0),
            session: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Cached block start, 0 when the next poll will run a full search
    pub fn cached_block_address(&self) -> u64 {
        self.block_address.load(Ordering::SeqCst)
    }

    /// Identity of the current target process, if resolved
    pub fn identity(&self) -> Option<Identity> {
        self.lock_session().as_ref().map(|s| s.identity.clone())
    }

    /// Forget the cached block address
    pub fn invalidate(&self) {
        self.block_address.store(0, Ordering::SeqCst);
    }

    /// Read the current lobby player names.
    ///
    /// Returns `None` when nothing could be read this cycle (process missing,
    /// identity unknown, block not found, scan error) or when another poll is
    /// still running. Errors are logged, never propagated.
    pub fn read_player_names<P: ProcessProvider>(&self, provider: &P) -> Option<Vec<String>> {
        match self.poll(provider) {
            Ok(Some(names)) => Some(names),
            Ok(None) => {
                error!("Player names not found.");
                None
            }
            Err(Error::Busy) => None,
            Err(e) if e.is_transient() => {
                warn!("{}", e);
                None
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Fallible form of [`read_player_names`](Self::read_player_names).
    ///
    /// `Ok(None)` means the search completed without finding the block.
    pub fn poll<P: ProcessProvider>(&self, provider: &P) -> Result<Option<Vec<String>>> {
        let _guard = self.try_begin()?;
        debug!("Reading player names...");

        let process = provider.find_process()?;
        let (identity, signature) = self.session_for(&process)?;

        let block = match self.block_address.load(Ordering::SeqCst) {
            0 => {
                let address = discover(
                    &process,
                    &signature,
                    &identity.display_name,
                    &self.config.scan_options(),
                    &self.block_address,
                )?;
                if address == 0 {
                    return Ok(None);
                }
                RecordBlock::new(address)
            }
            cached => RecordBlock::new(cached),
        };

        let slots = read_block_names(&process, block);
        if slots.first_is_empty() {
            info!("Memory address changed.");
            self.invalidate();
        }

        Ok(Some(slots.names()))
    }

    fn try_begin(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity and signature for `process`, resolved once per process id
    fn session_for<P: TargetProcess>(&self, process: &P) -> Result<(Identity, Signature)> {
        let mut session = self.lock_session();

        if let Some(current) = session.as_ref()
            && current.pid == process.pid()
        {
            return Ok((current.identity.clone(), current.signature));
        }

        if let Some(previous) = session.take() {
            info!(
                "Target process changed (pid {} -> {}), starting a new search",
                previous.pid,
                process.pid()
            );
        }
        self.invalidate();

        let identity = Identity::resolve(process)?;
        let signature = Signature::for_owner(identity.owner_id);
        debug!("Signature: {}", signature);

        *session = Some(Session {
            pid: process.pid(),
            identity: identity.clone(),
            signature,
        });
        Ok((identity, signature))
    }
}

impl Default for PlayerNameScanner {
    fn default() -> Self {
        Self::new()
    }
}
