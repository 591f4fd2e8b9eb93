//! Visited-state set keyed by an order-insensitive hash over `ModuleData`
//! (spec §4.5). Grounded on `ConfigurationSpace.h`'s `HashedState`/
//! `std::hash<HashedState>`.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::module::ModuleData;

use super::arena::{ConfigId, Origin};

/// Canonical form for comparing two configurations regardless of module
/// enumeration order: sorted by coordinate. Module identity never matters to
/// reconfiguration, only which cells are occupied and with what properties.
pub fn canonicalize(state: &[ModuleData]) -> Vec<ModuleData> {
    let mut v = state.to_vec();
    v.sort_by(|a, b| a.coords().cmp(&b.coords()));
    v
}

/// Order-insensitive hash over an already-canonicalized configuration,
/// XOR-combined the same way [`crate::module::ModulePropertySet`] hashes its
/// properties.
pub fn state_hash(canonical: &[ModuleData]) -> u64 {
    canonical
        .iter()
        .map(|m| {
            let mut h = DefaultHasher::new();
            m.hash(&mut h);
            h.finish()
        })
        .fold(0u64, |acc, h| acc ^ h)
}

#[derive(Debug, Clone, Copy)]
pub struct VisitedEntry {
    pub config: ConfigId,
    pub depth: i32,
    pub origin: Origin,
}

/// Hash-bucketed visited set. Buckets keep the colliding canonical states
/// alongside their entries so hash collisions never merge distinct
/// configurations.
#[derive(Debug, Default)]
pub struct VisitedSet {
    buckets: HashMap<u64, Vec<(Vec<ModuleData>, VisitedEntry)>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, state: &[ModuleData]) -> Option<VisitedEntry> {
        let canonical = canonicalize(state);
        let hash = state_hash(&canonical);
        self.buckets.get(&hash)?.iter().find(|(s, _)| *s == canonical).map(|(_, e)| *e)
    }

    pub fn insert(&mut self, state: &[ModuleData], entry: VisitedEntry) {
        let canonical = canonicalize(state);
        let hash = state_hash(&canonical);
        let bucket = self.buckets.entry(hash).or_default();
        if let Some(slot) = bucket.iter_mut().find(|(s, _)| *s == canonical) {
            slot.1 = entry;
        } else {
            bucket.push((canonical, entry));
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
