// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::options::RunOptions;
use crate::runner::{RunKey, TaskRunner};
use core::fmt::Display;
use std::sync::Arc;
use strand_core::{EventBus, Subscription};

/// Subscribe `handler` to `topic` so that it runs on `runner`'s worker pool
/// instead of the publisher's thread.
///
/// Every publish becomes one [`TaskRunner::run`] call carrying a clone of the
/// payload. With `options` left as `None` the calls compete for the key
/// `event:{topic}` with `cancel_previous` and `drop_outdated` set, so a burst
/// of events leaves only the newest handler invocation relevant. Options
/// without a key get the same default key.
///
/// Handler errors and pool rejections are logged, never propagated to the
/// publisher.
///
/// ```
/// use strand_core::EventBus;
/// use strand_exec::{subscribe_on, TaskRunner};
/// use strand_runtime::InlinePool;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let bus = EventBus::<u32>::new();
/// let runner: TaskRunner = TaskRunner::new(InlinePool);
/// let last = Arc::new(AtomicU32::new(0));
///
/// let sink = last.clone();
/// let _subscription = subscribe_on(&bus, "scan", &runner, move |value: u32| {
///     sink.store(value, Ordering::SeqCst);
///     Ok::<_, std::io::Error>(())
/// }, None);
///
/// bus.publish("scan", &7);
/// assert_eq!(last.load(Ordering::SeqCst), 7);
/// ```
pub fn subscribe_on<P, K, H, E>(
    bus: &EventBus<P>,
    topic: impl Into<String>,
    runner: &TaskRunner<K>,
    handler: H,
    options: Option<RunOptions<K>>,
) -> Subscription<P>
where
    P: Clone + Send + 'static,
    K: RunKey + From<String>,
    H: Fn(P) -> Result<(), E> + Send + Sync + 'static,
    E: Display + Send + 'static,
{
    let topic = topic.into();
    let mut options = options.unwrap_or_else(|| RunOptions::new().cancel_previous(true));
    if options.key.is_none() {
        options.key = Some(K::from(format!("event:{topic}")));
    }

    let handler = Arc::new(handler);
    let runner = runner.clone();
    let event_topic = topic.clone();
    bus.subscribe(topic, move |payload: &P| {
        let handler = handler.clone();
        let payload = payload.clone();
        let failed_topic = event_topic.clone();
        let submitted = runner.run(
            move || (*handler)(payload),
            |()| {},
            move |error| warn!("handler for topic {} failed: {}", failed_topic, error),
            options.clone(),
        );
        if let Err(error) = submitted {
            warn!("event on topic {} dropped: {}", event_topic, error);
        }
    })
}
