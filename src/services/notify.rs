//! Toast delivery: one notification queue per browser client.
//!
//! ARCHITECTURE
//! ============
//! `ToastHub` is created once in `main`, handed to handlers through
//! `AppState`, and shut down on exit. Each browser (identified by the
//! `toast_client` cookie) gets its own `toasts::ToastManager`, created by
//! [`ToastHub::show`] and dropped again once it drains. Handlers reach an
//! existing queue through [`ToastHub::existing`] to list, remove, or clear.
//! Expiry runs on tokio timers via [`TokioScheduler`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use toasts::{EmptyHook, Scheduler, Task, TimerHandle, ToastKind, ToastManager};

// =============================================================================
// TOKIO SCHEDULER
// =============================================================================

/// Runs deferred tasks on the ambient tokio runtime. Cancelling the returned
/// handle aborts the sleeping task, so dismissed toasts do not leave timers
/// parked until their original deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::new();
        let guard = handle.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                task();
            }
        });
        let abort = join.abort_handle();
        handle.with_cancel_hook(move || abort.abort())
    }
}

// =============================================================================
// HUB
// =============================================================================

/// Per-client toast queues.
///
/// A client's entry exists only while its queue holds toasts: the manager's
/// empty hook drops the entry as soon as the last toast expires or is
/// dismissed. Sticky toasts can keep entries alive, so the map is also
/// capped at `max_clients`, evicting the least recently used queue.
#[derive(Clone)]
pub struct ToastHub {
    clients: Arc<Mutex<Clients>>,
    scheduler: Arc<dyn Scheduler>,
    default_duration_ms: i64,
    max_clients: usize,
}

#[derive(Default)]
struct Clients {
    queues: HashMap<String, ClientQueue>,
    tick: u64,
}

struct ClientQueue {
    manager: ToastManager,
    last_used: u64,
}

impl Clients {
    fn touch(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Remove the least recently used queue once `max` entries exist.
    fn make_room(&mut self, max: usize) -> Option<(String, ToastManager)> {
        if self.queues.len() < max {
            return None;
        }
        let key = self
            .queues
            .iter()
            .min_by_key(|(_, queue)| queue.last_used)
            .map(|(key, _)| key.clone())?;
        self.queues.remove(&key).map(|queue| (key, queue.manager))
    }
}

impl ToastHub {
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>, default_duration_ms: i64) -> Self {
        Self {
            clients: Arc::new(Mutex::new(Clients::default())),
            scheduler,
            default_duration_ms,
            max_clients: crate::config::DEFAULT_TOAST_MAX_CLIENTS,
        }
    }

    /// Cap the number of live client queues (at least one).
    #[must_use]
    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients.max(1);
        self
    }

    #[must_use]
    pub fn default_duration_ms(&self) -> i64 {
        self.default_duration_ms
    }

    /// Show a toast in `client`'s queue, creating the queue on first use.
    /// Returns the toast id.
    pub fn show(&self, client: &str, kind: ToastKind, message: impl Into<String>, duration_ms: i64) -> String {
        let (id, evicted) = {
            let mut guard = self.lock();
            let clients = &mut *guard;
            let evicted = if clients.queues.contains_key(client) {
                None
            } else {
                clients.make_room(self.max_clients)
            };
            let tick = clients.touch();
            let queue = clients
                .queues
                .entry(client.to_owned())
                .or_insert_with(|| ClientQueue { manager: self.new_manager(client), last_used: tick });
            queue.last_used = tick;
            (queue.manager.show_for(kind, message, duration_ms), evicted)
        };

        if let Some((key, manager)) = evicted {
            tracing::debug!(client = %key, max_clients = self.max_clients, "toast queue evicted");
            manager.clear_all();
        }
        id
    }

    /// Show a toast with the configured default duration.
    pub fn notify(&self, client: &str, kind: ToastKind, message: impl Into<String>) -> String {
        let message = message.into();
        tracing::debug!(client, %kind, %message, "toast");
        self.show(client, kind, message, self.default_duration_ms)
    }

    /// Queue for `client` if it currently holds toasts.
    #[must_use]
    pub fn existing(&self, client: &str) -> Option<ToastManager> {
        let mut clients = self.lock();
        let tick = clients.touch();
        clients.queues.get_mut(client).map(|queue| {
            queue.last_used = tick;
            queue.manager.clone()
        })
    }

    /// Tear down one client's queue; its pending timers are cancelled.
    pub fn release(&self, client: &str) {
        let removed = self.lock().queues.remove(client);
        if let Some(queue) = removed {
            queue.manager.clear_all();
        }
    }

    /// Tear down every queue. Called once on shutdown.
    pub fn shutdown(&self) {
        let drained: Vec<ToastManager> = self.lock().queues.drain().map(|(_, q)| q.manager).collect();
        tracing::info!(clients = drained.len(), "toast hub shut down");
        for manager in drained {
            manager.clear_all();
        }
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.lock().queues.len()
    }

    fn new_manager(&self, client: &str) -> ToastManager {
        let clients = Arc::downgrade(&self.clients);
        let key = client.to_owned();
        let hook: EmptyHook = Arc::new(move |manager: &ToastManager| reclaim(&clients, &key, manager));
        ToastManager::with_empty_hook(Arc::clone(&self.scheduler), hook)
    }

    fn lock(&self) -> MutexGuard<'_, Clients> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drop `key`'s entry if it still maps to `manager` and the queue is empty.
/// A toast shown since the hook fired keeps the entry.
fn reclaim(clients: &Weak<Mutex<Clients>>, key: &str, manager: &ToastManager) {
    let Some(clients) = clients.upgrade() else {
        return;
    };
    let mut clients = clients.lock().unwrap_or_else(PoisonError::into_inner);
    let idle = clients
        .queues
        .get(key)
        .is_some_and(|queue| queue.manager.same_queue(manager) && queue.manager.is_empty());
    if idle {
        clients.queues.remove(key);
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
