//! Transient user-facing notifications ("toasts") with timed expiry.
//!
//! This crate is framework agnostic: it owns the ordered notification queue
//! and its expiry timers, and leaves rendering to whoever reads
//! [`ToastManager::toasts`]. Time comes from an injected [`Scheduler`].
//!
//! INVARIANTS
//! ==========
//! - The queue keeps insertion order.
//! - Removal is by id, never by position, so a timer firing for one entry
//!   cannot disturb another.
//! - Removal is idempotent: a timer and a user dismissal racing for the same
//!   id leave the same end state as a single removal.
//! - An owner's empty hook fires only after the queue lock is released, so
//!   the hook may take its own locks and inspect the manager.

pub mod schedule;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

pub use schedule::{ManualScheduler, Scheduler, Task, TimerHandle};

/// Duration used by [`ToastManager::show`].
pub const DEFAULT_DURATION_MS: i64 = 5000;

const ID_SUFFIX_LEN: usize = 8;

// =============================================================================
// TOAST
// =============================================================================

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`ToastKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown toast type: {0}")]
pub struct UnknownToastKind(pub String);

impl FromStr for ToastKind {
    type Err = UnknownToastKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(UnknownToastKind(raw.to_owned())),
        }
    }
}

/// A single active notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
    /// Lifetime in milliseconds; `<= 0` means sticky until dismissed.
    pub duration: i64,
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owner of one ordered notification queue.
///
/// Cloning yields another handle to the same queue. Expiry tasks only hold a
/// weak reference, so once every handle is dropped the queue is gone and any
/// outstanding timers are cancelled.
#[derive(Clone)]
pub struct ToastManager {
    shared: Arc<Shared>,
}

/// Called with the manager whenever a removal (expiry, dismissal, clear)
/// leaves its queue empty. Runs after the queue lock is released.
pub type EmptyHook = Arc<dyn Fn(&ToastManager) + Send + Sync>;

struct Shared {
    queue: Mutex<Queue>,
    scheduler: Arc<dyn Scheduler>,
    on_empty: Option<EmptyHook>,
}

#[derive(Default)]
struct Queue {
    toasts: Vec<Toast>,
    timers: HashMap<String, TimerHandle>,
}

impl Drop for Queue {
    fn drop(&mut self) {
        for timer in self.timers.values() {
            timer.cancel();
        }
    }
}

impl ToastManager {
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::build(scheduler, None)
    }

    /// Manager that reports each transition to an empty queue, so an owner
    /// holding many queues can reclaim the idle ones.
    #[must_use]
    pub fn with_empty_hook(scheduler: Arc<dyn Scheduler>, hook: EmptyHook) -> Self {
        Self::build(scheduler, Some(hook))
    }

    fn build(scheduler: Arc<dyn Scheduler>, on_empty: Option<EmptyHook>) -> Self {
        Self { shared: Arc::new(Shared { queue: Mutex::new(Queue::default()), scheduler, on_empty }) }
    }

    /// Show a notification for [`DEFAULT_DURATION_MS`].
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) -> String {
        self.show_for(kind, message, DEFAULT_DURATION_MS)
    }

    /// Append a notification and, when `duration_ms > 0`, schedule its
    /// removal. Returns the new id.
    pub fn show_for(&self, kind: ToastKind, message: impl Into<String>, duration_ms: i64) -> String {
        let mut queue = self.lock();
        let id = self.fresh_id(&queue);

        // Scheduled while the queue is locked: a very short timer must not
        // fire before the entry it removes has been inserted.
        if duration_ms > 0 {
            let weak = Arc::downgrade(&self.shared);
            let expired_id = id.clone();
            let delay = Duration::from_millis(duration_ms.unsigned_abs());
            let timer = self
                .shared
                .scheduler
                .schedule(delay, Box::new(move || expire(&weak, &expired_id)));
            queue.timers.insert(id.clone(), timer);
        }

        queue.toasts.push(Toast { id: id.clone(), kind, message: message.into(), duration: duration_ms });
        id
    }

    /// Remove the notification with `id`. Unknown ids are a no-op.
    /// Returns `true` if an entry was removed.
    pub fn remove(&self, id: &str) -> bool {
        let (removed, now_empty) = {
            let mut queue = self.lock();
            let removed = remove_locked(&mut queue, id);
            (removed, queue.toasts.is_empty())
        };
        if now_empty {
            self.report_empty();
        }
        removed
    }

    /// Drop every notification and cancel every pending expiry.
    pub fn clear_all(&self) {
        {
            let mut queue = self.lock();
            for (_, timer) in queue.timers.drain() {
                timer.cancel();
            }
            queue.toasts.clear();
        }
        self.report_empty();
    }

    /// Snapshot of the queue in insertion order.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }

    /// `true` when both handles point at the same queue.
    #[must_use]
    pub fn same_queue(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.shared.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_empty(&self) {
        if let Some(hook) = &self.shared.on_empty {
            hook(self);
        }
    }

    /// Time-based prefix plus a random suffix, retried until it does not
    /// collide with an active entry.
    fn fresh_id(&self, queue: &Queue) -> String {
        let now = self.shared.scheduler.now_ms();
        loop {
            let id = format_id(now, &random_suffix());
            if !queue.toasts.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for ToastManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastManager")
            .field("toasts", &self.lock().toasts)
            .finish_non_exhaustive()
    }
}

fn expire(shared: &Weak<Shared>, id: &str) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let manager = ToastManager { shared };
    let now_empty = {
        let mut queue = manager.lock();
        remove_locked(&mut queue, id) && queue.toasts.is_empty()
    };
    if now_empty {
        manager.report_empty();
    }
}

fn remove_locked(queue: &mut Queue, id: &str) -> bool {
    if let Some(timer) = queue.timers.remove(id) {
        timer.cancel();
    }
    let before = queue.toasts.len();
    queue.toasts.retain(|t| t.id != id);
    queue.toasts.len() != before
}

fn format_id(now_ms: u64, suffix: &str) -> String {
    format!("{now_ms:x}-{suffix}")
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
