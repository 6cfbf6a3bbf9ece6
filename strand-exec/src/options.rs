// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Single-flight settings for one `run` or `stream` call.
///
/// | field             | default | effect                                                    |
/// |-------------------|---------|-----------------------------------------------------------|
/// | `key`             | `None`  | slot the call competes for; `None` opts out entirely      |
/// | `cancel_previous` | `false` | cancel the key's previous holder before submitting        |
/// | `drop_outdated`   | `true`  | suppress callbacks once a newer call took the key         |
///
/// ```
/// use strand_exec::RunOptions;
///
/// let options: RunOptions = RunOptions::keyed("load-panel-x").cancel_previous(true);
///
/// assert_eq!(options.key.as_deref(), Some("load-panel-x"));
/// assert!(options.cancel_previous);
/// assert!(options.drop_outdated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions<K = String> {
    pub key: Option<K>,
    pub cancel_previous: bool,
    pub drop_outdated: bool,
}

impl<K> RunOptions<K> {
    /// Unkeyed options: the call never suppresses or is suppressed by another.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            key: None,
            cancel_previous: false,
            drop_outdated: true,
        }
    }

    /// Options competing for `key` with default flags.
    pub fn keyed(key: impl Into<K>) -> Self {
        Self::new().key(key)
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<K>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn cancel_previous(mut self, cancel_previous: bool) -> Self {
        self.cancel_previous = cancel_previous;
        self
    }

    #[must_use]
    pub fn drop_outdated(mut self, drop_outdated: bool) -> Self {
        self.drop_outdated = drop_outdated;
        self
    }
}

impl<K> Default for RunOptions<K> {
    fn default() -> Self {
        Self::new()
    }
}
