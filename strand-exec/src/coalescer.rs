// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Latest-wins hand-off from a stream's producer loop to the dispatch context.
//!
//! The producer never waits for the consumer. Each item overwrites a single
//! pending slot; at most one flush is in flight on the dispatcher at a time,
//! and that flush delivers whatever is newest when it runs. The number of
//! `on_item` calls is therefore bounded by dispatcher round-trips rather than
//! by the producer's rate, and items are never delivered out of order.

use parking_lot::Mutex;
use std::sync::Arc;
use strand_core::Dispatcher;

type ItemFn<T> = Box<dyn Fn(T) + Send + Sync + 'static>;
type FreshnessFn = Box<dyn Fn() -> bool + Send + Sync + 'static>;

struct Slot<T> {
    pending: Option<T>,
    dispatch_scheduled: bool,
}

pub(crate) struct Coalescer<T> {
    slot: Mutex<Slot<T>>,
    on_item: ItemFn<T>,
    is_current: FreshnessFn,
    dispatcher: Dispatcher,
}

impl<T> Coalescer<T>
where
    T: Send + 'static,
{
    pub(crate) fn new<F, C>(dispatcher: Dispatcher, on_item: F, is_current: C) -> Arc<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
        C: Fn() -> bool + Send + Sync + 'static,
    {
        Arc::new(Self {
            slot: Mutex::new(Slot {
                pending: None,
                dispatch_scheduled: false,
            }),
            on_item: Box::new(on_item),
            is_current: Box::new(is_current),
            dispatcher,
        })
    }

    /// Store `item` as the newest value and make sure a flush is scheduled.
    pub(crate) fn publish(self: &Arc<Self>, item: T) {
        {
            let mut slot = self.slot.lock();
            let replaced = slot.pending.replace(item).is_some();
            if slot.dispatch_scheduled {
                if replaced {
                    trace!("coalescer replaced an undelivered item");
                }
                return;
            }
            slot.dispatch_scheduled = true;
        }

        let this = Arc::clone(self);
        self.dispatcher.dispatch(move || this.flush());
    }

    /// Runs on the dispatch context.
    fn flush(&self) {
        if !(self.is_current)() {
            self.slot.lock().dispatch_scheduled = false;
            trace!("coalescer flush dropped: stream superseded");
            return;
        }

        let item = {
            let mut slot = self.slot.lock();
            slot.dispatch_scheduled = false;
            slot.pending.take()
        };

        if let Some(item) = item {
            (self.on_item)(item);
        }
    }
}
