//! Dispatchers built during one run, keyed by (router, fixture).

use std::collections::HashMap;

use crate::adapters::Dispatcher;

/// Why a route-set dispatcher is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    Excluded(String),
    Failed(String),
}

/// Owned by a single `Harness::run`; dropped when the run ends.
#[derive(Default)]
pub struct DispatcherRegistry {
    entries: HashMap<(String, String), Result<Box<dyn Dispatcher>, Unavailable>>,
}

impl DispatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, router: &str, fixture: &str, dispatcher: Box<dyn Dispatcher>) {
        self.entries
            .insert((router.to_string(), fixture.to_string()), Ok(dispatcher));
    }

    /// Remember that no dispatcher exists for this pair, and why.
    pub fn mark_unavailable(&mut self, router: &str, fixture: &str, reason: Unavailable) {
        self.entries
            .insert((router.to_string(), fixture.to_string()), Err(reason));
    }

    /// `None` when the pair was never built.
    pub fn get(&self, router: &str, fixture: &str) -> Option<Result<&dyn Dispatcher, &Unavailable>> {
        self.entries
            .get(&(router.to_string(), fixture.to_string()))
            .map(|entry| entry.as_ref().map(|dispatcher| dispatcher.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
