// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::time::Duration;
use strand_core::CancelSignal;

/// One-shot latch that holds a worker back until the test opens it.
#[derive(Clone, Debug, Default)]
pub struct Gate {
    signal: CancelSignal,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.signal.cancel();
    }

    pub fn is_open(&self) -> bool {
        self.signal.is_cancelled()
    }

    /// Block until the gate opens or `timeout` elapses. Returns whether it is open.
    pub fn wait(&self, timeout: Duration) -> bool {
        self.signal.wait_timeout(timeout)
    }
}
