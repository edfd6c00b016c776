use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::intake::domain::fingerprint::Fingerprint;

/// Fingerprints already handed to a worker during this run.
#[derive(Debug, Default)]
pub struct SeenSet {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `fingerprint`. Returns `true` only for the first caller.
    pub fn insert(&self, fingerprint: Fingerprint) -> bool {
        // A set of digests has no invariant a panicking holder could break.
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Fingerprint> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self {
            seen: Mutex::new(iter.into_iter().collect()),
        }
    }
}
