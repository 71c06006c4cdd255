//! Cancellable "animate then revert" timers and a debouncer.
//!
//! Must be used from within a tokio runtime.

use crate::dom::NodeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::sleep;

struct Pending<T> {
    saved: T,
    generation: u64,
    handle: AbortHandle,
}

/// Pending reverts keyed by element.
///
/// Arming a revert for an element that already has one pending cancels the
/// pending timer and keeps the value saved by the first arm, so the element
/// always returns to its state from before the first trigger.
pub struct PendingReverts<T> {
    pending: Mutex<HashMap<NodeId, Pending<T>>>,
    generation: AtomicU64,
}

impl<T> Default for PendingReverts<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }
}

impl<T: Clone + Send + 'static> PendingReverts<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Apply a change to `node` now and schedule `revert` to undo it after
    /// `delay`.
    ///
    /// `capture` runs only if nothing is pending for `node`; a pending entry
    /// keeps the value its first arm captured. If `capture` returns `None`
    /// nothing is applied or scheduled. Returns the value that will be
    /// restored.
    ///
    /// `capture`, `apply` and `revert` all run with the pending table locked,
    /// so a revert can never interleave with a re-arm of the same element.
    /// They must not call back into this table.
    pub fn arm<C, A, R>(
        self: &Arc<Self>,
        node: NodeId,
        delay: Duration,
        capture: C,
        apply: A,
        revert: R,
    ) -> Option<T>
    where
        C: FnOnce() -> Option<T>,
        A: FnOnce(),
        R: FnOnce(T) + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());

        let saved = match pending.remove(&node) {
            Some(previous) => {
                previous.handle.abort();
                previous.saved
            }
            None => capture()?,
        };
        apply();

        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let mut pending = this.pending.lock().unwrap_or_else(|e| e.into_inner());
            let current = matches!(pending.get(&node), Some(entry) if entry.generation == generation);
            if current {
                if let Some(entry) = pending.remove(&node) {
                    revert(entry.saved);
                }
            }
        });

        pending.insert(
            node,
            Pending {
                saved: saved.clone(),
                generation,
                handle: task.abort_handle(),
            },
        );
        Some(saved)
    }

    pub fn is_pending(&self, node: NodeId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&node)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Runs a callback once calls have stopped for `wait`.
pub struct Debouncer {
    wait: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: Mutex::new(None),
        }
    }

    /// Cancel any pending call and schedule `f` after the wait.
    pub fn call<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let wait = self.wait;
        let task = tokio::spawn(async move {
            sleep(wait).await;
            f();
        });
        *pending = Some(task.abort_handle());
        task
    }

    /// Cancel the pending call, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take() {
            previous.abort();
        }
    }
}
