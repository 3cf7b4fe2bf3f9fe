//! Coalescing of concurrent requests for the same resource
//!
//! [`InFlight`] merges concurrent calls with equal keys into one underlying
//! operation. The first caller (the leader) runs the operation; callers that
//! arrive while it is running wait and receive a clone of the leader's
//! result. The entry is removed as soon as the operation settles, success or
//! failure, so a later call starts a fresh request.
//!
//! The check-then-insert on the in-flight map happens under one lock,
//! before any suspension point, so two callers can never both become leader
//! for the same key.
//!
//! # Cancellation
//!
//! The leader holds a guard that removes the entry and wakes followers when
//! it is dropped, whether the operation finished or the leader's future was
//! dropped mid-flight (a timeout, `select!` or an aborted task). Followers
//! woken without a result start over, and one of them becomes the new
//! leader.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Notify, OnceCell};

type Slots<K, V, E> = Mutex<HashMap<K, Arc<Slot<V, E>>>>;

/// Shared state of one in-flight request
#[derive(Debug)]
struct Slot<V, E> {
    result: OnceCell<Result<V, E>>,
    /// Set once the leader is gone, with or without a result
    settled: AtomicBool,
    notify: Notify,
}

impl<V, E> Slot<V, E> {
    fn new() -> Self {
        Self {
            result: OnceCell::new(),
            settled: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }
}

/// Held by the leader; settles the slot when dropped
struct Settle<'a, K: Hash + Eq, V, E> {
    slots: &'a Slots<K, V, E>,
    key: K,
    slot: Arc<Slot<V, E>>,
}

impl<K: Hash + Eq, V, E> Drop for Settle<'_, K, V, E> {
    fn drop(&mut self) {
        {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slots
                .get(&self.key)
                .is_some_and(|current| Arc::ptr_eq(current, &self.slot))
            {
                slots.remove(&self.key);
            }
        }
        self.slot.settled.store(true, Ordering::SeqCst);
        self.slot.notify.notify_waiters();
    }
}

/// Registry of in-flight requests keyed by `K`
#[derive(Debug)]
pub struct InFlight<K, V, E> {
    slots: Slots<K, V, E>,
}

impl<K, V, E> InFlight<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<Slot<V, E>>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `operation` for `key`, or join the request already running for it
    ///
    /// If the leader this call joined is dropped before producing a result,
    /// the call retries and may run `operation` itself.
    pub async fn run<F, Fut>(&self, key: K, operation: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loop {
            let (slot, is_leader) = {
                let mut slots = self.lock();
                match slots.get(&key) {
                    Some(slot) => (Arc::clone(slot), false),
                    None => {
                        let slot = Arc::new(Slot::new());
                        slots.insert(key.clone(), Arc::clone(&slot));
                        (slot, true)
                    }
                }
            };

            if is_leader {
                let settle = Settle {
                    slots: &self.slots,
                    key,
                    slot: Arc::clone(&slot),
                };
                let result = operation().await;

                // Only the leader writes, so set() cannot fail
                let _ = slot.result.set(result.clone());
                drop(settle);

                return result;
            }

            if let Some(result) = Self::wait(&slot).await {
                return result;
            }
            tracing::debug!("In-flight leader dropped without a result, retrying");
        }
    }

    /// Wait for the leader of `slot`; `None` when it went away without a result
    async fn wait(slot: &Slot<V, E>) -> Option<Result<V, E>> {
        loop {
            // Register interest before checking, so a notify between the
            // check and the await is not lost
            let notified = slot.notify.notified();
            if let Some(result) = slot.result.get() {
                return Some(result.clone());
            }
            if slot.settled.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }

    /// Whether a request for `key` is currently running
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of requests currently running
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<K, V, E> Default for InFlight<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
