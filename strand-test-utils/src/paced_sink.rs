// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::time::Duration;
use std::thread::{self, JoinHandle};
use strand_core::{dispatch_queue, QueueSink};

/// A dispatch sink served by a dedicated thread that sleeps `delay` before
/// every callback, modelling a busy UI loop.
///
/// The thread exits once every clone of the returned sink is dropped; joining
/// the handle yields how many callbacks it ran.
pub fn paced_sink(delay: Duration) -> (QueueSink, JoinHandle<usize>) {
    let (sink, queue) = dispatch_queue();
    let pump = thread::spawn(move || {
        let mut ran = 0;
        while let Some(callback) = queue.next_blocking() {
            thread::sleep(delay);
            callback();
            ran += 1;
        }
        ran
    });
    (sink, pump)
}
