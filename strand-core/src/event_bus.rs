// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Topic-based publish/subscribe with synchronous delivery.
//!
//! ## Characteristics
//!
//! - **Synchronous**: handlers run on the publisher's thread, in subscription order.
//! - **Hot**: a handler only sees payloads published after it subscribed.
//! - **Thread-safe**: cheap to clone; all clones share the same topic table.
//! - **Lock-free delivery**: the handler list is snapshotted under the lock
//!   and invoked outside it, so a handler may subscribe, unsubscribe or
//!   publish re-entrantly.
//!
//! To move a handler off the publisher's thread, bridge it through the task
//! runner with `strand_exec::subscribe_on`.
//!
//! ## Example
//!
//! ```
//! use strand_core::EventBus;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use std::sync::Arc;
//!
//! let bus = EventBus::<i32>::new();
//! let total = Arc::new(AtomicI32::new(0));
//!
//! let sink = total.clone();
//! let subscription = bus.subscribe("scan", move |delta: &i32| {
//!     sink.fetch_add(*delta, Ordering::SeqCst);
//! });
//!
//! bus.publish("scan", &5);
//! bus.publish("other", &100);
//! subscription.unsubscribe();
//! bus.publish("scan", &7);
//!
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//! ```

use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync + 'static>;

struct BusState<P> {
    next_id: u64,
    topics: HashMap<String, Vec<(u64, Handler<P>)>>,
}

/// Synchronous multi-topic event bus.
pub struct EventBus<P> {
    state: Arc<Mutex<BusState<P>>>,
}

impl<P: 'static> EventBus<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for `topic`.
    ///
    /// The handler stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the subscription does not remove it.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription<P>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state
            .topics
            .entry(topic.clone())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            state: self.state.clone(),
            topic,
            id,
        }
    }

    /// Invoke every handler subscribed to `topic`, on this thread.
    ///
    /// Returns how many handlers were invoked.
    pub fn publish(&self, topic: &str, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = {
            let state = self.state.lock();
            state
                .topics
                .get(topic)
                .map(|subs| subs.iter().map(|(_, handler)| handler.clone()).collect())
                .unwrap_or_default()
        };

        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state.lock().topics.get(topic).map_or(0, Vec::len)
    }
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventBus")
            .field("topics", &state.topics.len())
            .finish()
    }
}

/// Registration token returned by [`EventBus::subscribe`].
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription<P> {
    state: Arc<Mutex<BusState<P>>>,
    topic: String,
    id: u64,
}

impl<P> Subscription<P> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Remove the handler. Payloads already being delivered are unaffected.
    pub fn unsubscribe(self) {
        let mut state = self.state.lock();
        if let Some(subs) = state.topics.get_mut(&self.topic) {
            subs.retain(|(id, _)| *id != self.id);
            if subs.is_empty() {
                state.topics.remove(&self.topic);
            }
        }
    }
}

impl<P> fmt::Debug for Subscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}
