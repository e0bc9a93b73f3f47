//! Single-instance cancellable timer.
//!
//! Every periodic or delayed activity in the session core (the status poll
//! loop, the event long-poll loop) is owned by exactly one
//! [`CancellableTimer`].  Arming a timer aborts whatever it was running
//! before, so at any instant a component has at most one pending timer task.
//! Dropping the timer cancels it.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::trace;

/// A slot holding at most one spawned timer task.
pub struct CancellableTimer {
    name: &'static str,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl CancellableTimer {
    /// Creates an unarmed timer.  `name` only appears in trace logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(None),
        }
    }

    /// Spawns `task`, aborting any task armed previously.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
            trace!(timer = self.name, "re-armed; previous task aborted");
        }
        *slot = Some(tokio::spawn(task));
    }

    /// Aborts the armed task, if any.  Returns `true` if something was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                trace!(timer = self.name, pending, "cancelled");
                pending
            }
            None => false,
        }
    }

    /// `true` while an armed task has not yet finished.
    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
