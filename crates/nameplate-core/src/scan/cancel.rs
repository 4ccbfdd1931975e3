use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation shared by all workers of one discovery.
///
/// Trips either explicitly (a worker found the block) or once the optional
/// deadline has passed.
pub struct CancelToken {
    cancelled: AtomicBool,
    timed_out: AtomicBool,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cheap check, suitable for every scan window
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Trip the token if the deadline has passed. Returns `true` when
    /// cancelled for any reason.
    pub fn check_deadline(&self) -> bool {
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.timed_out.store(true, Ordering::SeqCst);
            self.cancel();
        }
        self.is_cancelled()
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::SeqCst)
    }
}
