//! Timeout-Bound Wait Queue
//!
//! A handler can arm itself under one or more correlation keys and wait for
//! the first event carrying any of them. Exactly one of delivery or expiry
//! wins: whichever removes the entry from the table first owns the handler.
//!
//! The table lives behind a `std::sync::Mutex` that is never held across an
//! `.await` or while a handler runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default upper bound on how long a wait may stay armed.
pub const DEFAULT_WAIT_CEILING: Duration = Duration::from_secs(3);

/// How an armed wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// An event arrived under one of the armed keys.
    Delivered(T),
    /// The deadline passed first.
    TimedOut,
}

impl<T> WaitOutcome<T> {
    /// The delivered event, if any.
    pub fn delivered(self) -> Option<T> {
        match self {
            Self::Delivered(event) => Some(event),
            Self::TimedOut => None,
        }
    }

    /// Whether the deadline passed before any event arrived.
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Errors raised when arming a wait.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitQueueError {
    /// Another wait already owns this key.
    #[error("A wait is already armed for key {0:?}")]
    AlreadyArmed(String),
    /// Nothing to wait for.
    #[error("A wait needs at least one key")]
    NoKeys,
}

type WaitHandler<T> = Box<dyn FnOnce(WaitOutcome<T>) + Send>;

/// One armed wait, shared by every key it was armed under.
struct WaitEntry<T> {
    keys: Vec<String>,
    deadline: Instant,
    handler: Mutex<Option<WaitHandler<T>>>,
}

impl<T> WaitEntry<T> {
    fn take_handler(&self) -> Option<WaitHandler<T>> {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Runs the handler. Only the caller that removed the entry gets here,
    /// so the slot is always full; the `Option` only guards against misuse.
    fn fire(&self, outcome: WaitOutcome<T>) {
        match self.take_handler() {
            Some(handler) => handler(outcome),
            None => warn!(keys = ?self.keys, "Wait handler already consumed"),
        }
    }
}

/// A wait removed from the table by [`WaitQueue::take`], not yet fired.
///
/// Dropping it without calling [`PendingWait::fire`] resolves the wait as
/// [`WaitOutcome::TimedOut`].
pub struct PendingWait<T> {
    entry: Arc<WaitEntry<T>>,
}

impl<T> PendingWait<T> {
    /// Every key the wait was armed under.
    pub fn keys(&self) -> &[String] {
        &self.entry.keys
    }

    /// Hands the outcome to the waiting handler.
    pub fn fire(self, outcome: WaitOutcome<T>) {
        self.entry.fire(outcome);
    }
}

impl<T> Drop for PendingWait<T> {
    fn drop(&mut self) {
        if let Some(handler) = self.entry.take_handler() {
            debug!(keys = ?self.entry.keys, "Taken wait dropped unfired");
            handler(WaitOutcome::TimedOut);
        }
    }
}

impl<T> fmt::Debug for PendingWait<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWait")
            .field("keys", &self.entry.keys)
            .finish_non_exhaustive()
    }
}

/// Table of armed waits keyed by correlation key.
pub struct WaitQueue<T> {
    table: Arc<Mutex<HashMap<String, Arc<WaitEntry<T>>>>>,
    ceiling: Duration,
}

impl<T> Clone for WaitQueue<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            ceiling: self.ceiling,
        }
    }
}

impl<T> fmt::Debug for WaitQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue")
            .field("armed_keys", &self.len())
            .field("ceiling", &self.ceiling)
            .finish()
    }
}

impl<T> Default for WaitQueue<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_CEILING)
    }
}

impl<T> WaitQueue<T> {
    /// Upper bound applied to every armed timeout.
    pub const fn ceiling(&self) -> Duration {
        self.ceiling
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<WaitEntry<T>>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the wait armed under `key`, together with its sibling keys,
    /// without running its handler.
    pub fn take(&self, key: &str) -> Option<PendingWait<T>> {
        let mut table = self.lock();
        let entry = table.remove(key)?;
        for sibling in &entry.keys {
            table.remove(sibling);
        }
        Some(PendingWait { entry })
    }

    /// Whether a wait is armed under `key`.
    pub fn is_armed(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of armed keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no wait is armed.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T> WaitQueue<T>
where
    T: Send + 'static,
{
    /// Creates an empty queue whose waits never outlive `ceiling`.
    pub fn new(ceiling: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(HashMap::new())),
            ceiling,
        }
    }

    /// Arms `handler` under every key in `keys` and returns immediately.
    ///
    /// The timeout is clamped to the ceiling. If any key is already armed
    /// nothing is registered. Must be called from within a tokio runtime.
    pub fn arm<I, K, F>(&self, keys: I, timeout: Duration, handler: F) -> Result<(), WaitQueueError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: FnOnce(WaitOutcome<T>) + Send + 'static,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        if unique.is_empty() {
            return Err(WaitQueueError::NoKeys);
        }

        let timeout = timeout.min(self.ceiling);
        let entry = Arc::new(WaitEntry {
            keys: unique,
            deadline: Instant::now() + timeout,
            handler: Mutex::new(Some(Box::new(handler))),
        });

        {
            let mut table = self.lock();
            if let Some(taken) = entry.keys.iter().find(|key| table.contains_key(*key)) {
                return Err(WaitQueueError::AlreadyArmed(taken.clone()));
            }
            for key in &entry.keys {
                table.insert(key.clone(), Arc::clone(&entry));
            }
        }

        debug!(keys = ?entry.keys, timeout_ms = timeout.as_millis() as u64, "Wait armed");

        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(entry.deadline).await;
            queue.expire(&entry);
        });

        Ok(())
    }

    /// Delivers `event` to the wait armed under `key`.
    ///
    /// Returns `false` when nothing was armed.
    pub fn deliver(&self, key: &str, event: T) -> bool {
        match self.take(key) {
            Some(pending) => {
                pending.fire(WaitOutcome::Delivered(event));
                true
            }
            None => false,
        }
    }

    /// Timer side of the race. Only keys still owned by this entry are
    /// removed; if delivery got there first there is nothing left.
    fn expire(&self, entry: &Arc<WaitEntry<T>>) {
        let won = {
            let mut table = self.lock();
            let mut removed = false;
            for key in &entry.keys {
                if table.get(key).is_some_and(|current| Arc::ptr_eq(current, entry)) {
                    table.remove(key);
                    removed = true;
                }
            }
            removed
        };

        if won {
            debug!(keys = ?entry.keys, "Wait timed out");
            entry.fire(WaitOutcome::TimedOut);
        }
    }

    /// Arms a wait and resolves with its outcome.
    pub async fn await_event<I, K>(
        &self,
        keys: I,
        timeout: Duration,
    ) -> Result<WaitOutcome<T>, WaitQueueError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let (tx, rx) = oneshot::channel();
        self.arm(keys, timeout, move |outcome| {
            let _ = tx.send(outcome);
        })?;
        Ok(rx.await.unwrap_or(WaitOutcome::TimedOut))
    }
}
