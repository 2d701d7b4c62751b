//! Content-addressed cache of suggestion sets.
//!
//! Keys are SHA-256 digests of exactly what the engine reads: field names
//! and examples on the layout side, column names and sampled values on the
//! source side, plus the threshold. Two inputs that sample identically share
//! an entry even when the rest of the table differs.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use claims_model::{SuggestionSet, TargetLayout};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::engine::MappingEngine;
use crate::sample::{ColumnProfile, SampleSource};

/// Default number of cached suggestion sets.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Hex SHA-256 of a target layout's names and examples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayoutFingerprint(String);

impl LayoutFingerprint {
    pub fn of(layout: &TargetLayout) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"layout");
        for field in layout.iter() {
            update_str(&mut hasher, &field.name);
            update_str(&mut hasher, &field.example);
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex SHA-256 of a source's column names, samples, and sample size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceFingerprint(String);

impl SourceFingerprint {
    pub fn of(profiles: &[ColumnProfile], sample_size: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"source");
        hasher.update((sample_size as u64).to_le_bytes());
        for column in profiles {
            update_str(&mut hasher, &column.name);
            hasher.update((column.samples.len() as u64).to_le_bytes());
            for value in &column.samples {
                update_str(&mut hasher, value);
            }
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length-prefixed so that `("ab", "c")` and `("a", "bc")` differ.
fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub layout: LayoutFingerprint,
    pub source: SourceFingerprint,
    /// `f64::to_bits` of the threshold.
    pub threshold_bits: u64,
}

/// Bounded cache wrapping [`MappingEngine::suggest`].
///
/// Entries are evicted oldest-inserted first once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct SuggestionCache {
    capacity: usize,
    entries: HashMap<CacheKey, SuggestionSet>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SuggestionCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// The key [`SuggestionCache::get_or_compute`] would use.
    pub fn key_for<S: SampleSource + ?Sized>(
        engine: &MappingEngine,
        layout: &TargetLayout,
        source: &S,
    ) -> CacheKey {
        let profiles = engine.profile(source);
        Self::key_for_profiles(engine, layout, &profiles)
    }

    fn key_for_profiles(
        engine: &MappingEngine,
        layout: &TargetLayout,
        profiles: &[ColumnProfile],
    ) -> CacheKey {
        CacheKey {
            layout: LayoutFingerprint::of(layout),
            source: SourceFingerprint::of(profiles, engine.options().sample_size),
            threshold_bits: engine.threshold().to_bits(),
        }
    }

    /// Returns the cached suggestions, computing and storing them on a miss.
    pub fn get_or_compute<S: SampleSource + ?Sized>(
        &mut self,
        engine: &MappingEngine,
        layout: &TargetLayout,
        source: &S,
    ) -> SuggestionSet {
        let profiles = engine.profile(source);
        let key = Self::key_for_profiles(engine, layout, &profiles);
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            trace!(layout = %key.layout, source = %key.source, "suggestion cache hit");
            return cached.clone();
        }

        self.misses += 1;
        let suggestions = engine.suggest_profiled(layout, &profiles);
        self.insert(key, suggestions.clone());
        suggestions
    }

    /// Looks up a key without computing. Does not touch the counters.
    pub fn get(&self, key: &CacheKey) -> Option<&SuggestionSet> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: CacheKey, suggestions: SuggestionSet) {
        if self.entries.insert(key.clone(), suggestions).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(layout = %oldest.layout, source = %oldest.source, "evicted cached suggestions");
            }
        }
    }

    /// Drops every entry computed for `layout`. Returns how many were removed.
    pub fn invalidate_layout(&mut self, layout: &LayoutFingerprint) -> usize {
        self.retain(|key| &key.layout != layout)
    }

    /// Drops every entry computed for `source`. Returns how many were removed.
    pub fn invalidate_source(&mut self, source: &SourceFingerprint) -> usize {
        self.retain(|key| &key.source != source)
    }

    fn retain(&mut self, keep: impl Fn(&CacheKey) -> bool) -> usize {
        let before = self.order.len();
        self.order.retain(|key| keep(key));
        self.entries.retain(|key, _| keep(key));
        before - self.order.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
