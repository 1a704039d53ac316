//! Deferred-callback scheduling used for toast expiry.
//!
//! DESIGN
//! ======
//! `ToastManager` never touches a clock or a runtime directly. It asks a
//! [`Scheduler`] for the current time (id generation) and to run a task after
//! a delay. The server plugs in a tokio-backed scheduler; tests use
//! [`ManualScheduler`], a virtual clock advanced by hand, so expiry is
//! deterministic and never waits on wall-clock time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Source of time and deferred execution.
pub trait Scheduler: Send + Sync {
    /// Milliseconds since the Unix epoch (or since the virtual epoch).
    fn now_ms(&self) -> u64;

    /// Run `task` once `delay` has elapsed, unless the returned handle is
    /// cancelled first.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

// =============================================================================
// TIMER HANDLE
// =============================================================================

/// Cancellation token for a scheduled task. Clones share the same flag and
/// the same cancel hook.
#[derive(Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl TimerHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a hook run once, on the first [`TimerHandle::cancel`]. Runtime
    /// schedulers use it to free the waiting task instead of letting it
    /// sleep out the full delay.
    #[must_use]
    pub fn with_cancel_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(hook));
        self
    }

    /// Prevent the task from running. Cancelling twice is harmless.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            if let Some(hook) = &self.on_cancel {
                hook();
            }
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .field("has_cancel_hook", &self.on_cancel.is_some())
            .finish()
    }
}

// =============================================================================
// MANUAL SCHEDULER
// =============================================================================

/// Virtual-clock scheduler. Time only moves when [`ManualScheduler::advance`]
/// is called; due tasks then run in deadline order (FIFO for equal deadlines).
#[derive(Default)]
pub struct ManualScheduler {
    inner: Mutex<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    now_ms: u64,
    seq: u64,
    /// (deadline, insertion sequence) -> task.
    pending: BTreeMap<(u64, u64), (TimerHandle, Task)>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the virtual clock at `now_ms` instead of zero.
    #[must_use]
    pub fn starting_at(now_ms: u64) -> Self {
        let scheduler = Self::default();
        scheduler.lock().now_ms = now_ms;
        scheduler
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// The internal lock is released while a task runs, so tasks may
    /// schedule further work; anything that falls due within the same
    /// advance window also runs.
    pub fn advance(&self, by: Duration) {
        let target = {
            let inner = self.lock();
            inner.now_ms.saturating_add(duration_ms(by))
        };

        loop {
            let next = {
                let mut inner = self.lock();
                let due = inner
                    .pending
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(deadline, _)| *deadline <= target);
                match due {
                    Some(key) => {
                        inner.now_ms = inner.now_ms.max(key.0);
                        inner.pending.remove(&key)
                    }
                    None => {
                        inner.now_ms = target;
                        None
                    }
                }
            };

            let Some((handle, task)) = next else {
                break;
            };
            if !handle.is_cancelled() {
                task();
            }
        }
    }

    /// Number of scheduled tasks that have neither run nor been cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock()
            .pending
            .values()
            .filter(|(handle, _)| !handle.is_cancelled())
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::new();
        let mut inner = self.lock();
        let deadline = inner.now_ms.saturating_add(duration_ms(delay));
        let seq = inner.seq;
        inner.seq += 1;
        inner.pending.insert((deadline, seq), (handle.clone(), task));
        handle
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
