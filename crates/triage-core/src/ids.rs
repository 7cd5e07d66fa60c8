//! Identifier generation for tool calls and agent nodes

use std::sync::atomic::{AtomicU64, Ordering};
use ulid::Ulid;

/// Source of unique identifiers
pub trait IdGenerator: Send + Sync {
    /// Next unique identifier
    fn next(&self) -> String;
}

/// Sortable ULID identifiers (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidIdGenerator;

impl IdGenerator for UlidIdGenerator {
    fn next(&self) -> String {
        Ulid::new().to_string()
    }
}

/// Deterministic `prefix-N` identifiers, safe across threads
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Identifiers handed out so far
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
