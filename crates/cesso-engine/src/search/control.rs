//! Search control — stop flag and time budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Controls when a search should stop.
///
/// Checked between iterative-deepening iterations (mandatory) and,
/// cooperatively, once every 2048 nodes inside the tree (permitted but not
/// required by the time budget contract).
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Mutex<Option<Instant>>,
    deadline: Option<Duration>,
}

impl SearchControl {
    /// Create control for `go infinite` — only the external stop flag matters.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self { stopped, start: Mutex::new(Some(Instant::now())), deadline: None }
    }

    /// Create control with a time budget; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, deadline: Duration) -> Self {
        Self { stopped, start: Mutex::new(Some(Instant::now())), deadline: Some(deadline) }
    }

    /// Check whether the search should abort immediately.
    ///
    /// Returns `true` if the external stop flag was set, or the deadline has
    /// passed. The deadline is only checked every 2048 nodes.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        if nodes & 2047 != 0 {
            return false;
        }
        if let Some(deadline) = self.deadline
            && self.elapsed() >= deadline
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Check whether iterative deepening should start a new iteration.
    pub fn should_stop_iterating(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => self.elapsed() >= deadline,
            None => false,
        }
    }

    /// Elapsed time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.start.lock().expect("start mutex poisoned").map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}
