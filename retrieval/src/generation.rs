use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket attached to one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter giving last-issued-wins semantics.
///
/// Each dispatch takes a ticket with [`RequestGenerations::issue`]; when its
/// response arrives the caller keeps it only if [`RequestGenerations::is_latest`]
/// still holds. Responses are therefore applied in issue order, not in the
/// order the network happens to resolve them.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    latest: Arc<AtomicU64>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Most recently issued ticket, if any.
    pub fn current(&self) -> Option<Generation> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(Generation(n)),
        }
    }
}
