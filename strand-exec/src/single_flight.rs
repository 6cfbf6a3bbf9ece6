// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-key bookkeeping behind "latest request wins".
//!
//! Every keyed submission draws a generation token from [`SingleFlight::begin`].
//! Tokens for one key strictly increase, so an outcome is *current* exactly
//! when its token is still the newest one issued under its key. Anything
//! older is stale and gets dropped by the runner instead of reaching a
//! callback.
//!
//! The registry lock guards bookkeeping only. Cancellation handles, which may
//! run completion hooks and therefore caller code, are always invoked after
//! the lock is released.

use core::fmt::{self, Debug};
use core::hash::Hash;
use parking_lot::Mutex;
use std::collections::HashMap;
use strand_core::{CancelSignal, TaskHandle};

/// Monotonic per-key token. `0` is reserved for unkeyed submissions and for
/// keys that were never used.
pub type Generation = u64;

/// Handles recorded for the holder of a key.
#[derive(Clone, Debug)]
pub struct FlightHandles {
    task: TaskHandle,
    signal: Option<CancelSignal>,
}

impl FlightHandles {
    /// Handles of a one-shot task: cancelling only prevents a pending start.
    pub fn task(task: TaskHandle) -> Self {
        Self { task, signal: None }
    }

    /// Handles of a stream: cancelling also raises its cooperative stop signal.
    pub fn stream(task: TaskHandle, signal: CancelSignal) -> Self {
        Self {
            task,
            signal: Some(signal),
        }
    }

    /// Raise the stop signal (if any), then try to cancel the pending job.
    ///
    /// Returns `true` only if the job was prevented from starting.
    pub fn cancel(&self) -> bool {
        if let Some(signal) = &self.signal {
            signal.cancel();
        }
        self.task.cancel()
    }
}

/// Bookkeeping for one key.
struct Entry {
    token: Generation,
    // Tokens below this one were asked to cancel and do so on commit.
    cancel_below: Generation,
    // Newest committed holder, possibly older than `token`.
    holder: Option<(Generation, FlightHandles)>,
}

impl Entry {
    const fn vacant() -> Self {
        Self {
            token: 0,
            cancel_below: 0,
            holder: None,
        }
    }

    fn holds_at_least(&self, token: Generation) -> bool {
        self.holder.as_ref().is_some_and(|(held, _)| *held >= token)
    }
}

/// Registry of the newest generation and its handles, per key.
pub struct SingleFlight<K> {
    entries: Mutex<HashMap<K, Entry>>,
}

impl<K> SingleFlight<K>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Issue the next generation for `key`.
    ///
    /// Returns `0` for unkeyed submissions, `1` on first use of a key and
    /// `previous + 1` afterwards. The new generation is reserved immediately,
    /// so two concurrent callers never share a token.
    ///
    /// Without `cancel_previous` the last committed holder stays recorded
    /// until the new submission commits, so [`cancel`](Self::cancel) can still
    /// reach it if that submission is rejected. With `cancel_previous`, the
    /// recorded holder is cancelled after the lock is released; a previous
    /// submission that has not committed yet cancels itself on
    /// [`commit`](Self::commit).
    pub fn begin(&self, key: Option<&K>, cancel_previous: bool) -> Generation {
        let Some(key) = key else {
            return 0;
        };

        let (token, previous) = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::vacant);
            entry.token += 1;
            let previous = if cancel_previous {
                entry.cancel_below = entry.token;
                entry.holder.take()
            } else {
                None
            };
            (entry.token, previous)
        };

        if let Some((_, previous)) = previous {
            previous.cancel();
        }
        token
    }

    /// Record the handles of the submission holding `token`.
    ///
    /// Unkeyed submissions are never recorded. Handles whose token was asked
    /// to cancel are cancelled instead of stored. Otherwise they replace the
    /// recorded holder unless a newer one committed first. Returns whether the
    /// handles were stored.
    pub fn commit(&self, key: Option<&K>, token: Generation, handles: FlightHandles) -> bool {
        let Some(key) = key else {
            return false;
        };

        let cancel = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };
            if token < entry.cancel_below {
                true
            } else if entry.holds_at_least(token) {
                false
            } else {
                entry.holder = Some((token, handles));
                return true;
            }
        };

        if cancel {
            handles.cancel();
        }
        false
    }

    /// Whether an outcome carrying `token` may still be delivered.
    ///
    /// Always `true` for unkeyed submissions and when `drop_outdated` is off.
    pub fn is_current(&self, key: Option<&K>, token: Generation, drop_outdated: bool) -> bool {
        match key {
            Some(key) if drop_outdated => self
                .entries
                .lock()
                .get(key)
                .is_some_and(|entry| entry.token == token),
            _ => true,
        }
    }

    /// Cancel whatever currently holds `key`.
    ///
    /// Raises the recorded holder's stop signal (streams) and returns `true`
    /// only if its job was still pending and is now prevented from running.
    /// Submissions that reserved a generation but have not committed yet
    /// cancel themselves on [`commit`](Self::commit).
    pub fn cancel(&self, key: &K) -> bool {
        let handles = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };
            entry.cancel_below = entry.token + 1;
            entry.holder.as_ref().map(|(_, handles)| handles.clone())
        };
        handles.is_some_and(|handles| handles.cancel())
    }

    /// Cancel the holders of every known key.
    ///
    /// Works on a snapshot of keys, so entries added or replaced meanwhile are
    /// tolerated.
    pub fn cancel_all(&self) {
        let keys: Vec<K> = self.entries.lock().keys().cloned().collect();
        for key in &keys {
            self.cancel(key);
        }
    }

    /// Newest generation issued for `key`, `0` if none.
    pub fn generation(&self, key: &K) -> Generation {
        self.entries.lock().get(key).map_or(0, |entry| entry.token)
    }

    /// Number of keys that have ever been used.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K> Default for SingleFlight<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug> Debug for SingleFlight<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_map()
            .entries(entries.iter().map(|(key, entry)| (key, entry.token)))
            .finish()
    }
}
