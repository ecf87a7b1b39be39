//! Assembled itineraries memoized per plan id and extraction config

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::assembler::assemble_with;
use crate::config::ExtractionConfig;
use crate::model::{DisplayItinerary, RawPlan};

/// Entries live for an hour unless configured otherwise
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Plan id plus the serialized config the view was assembled with
type CacheKey = (String, String);

#[derive(Debug)]
pub struct ItineraryCache {
    entries: RwLock<HashMap<CacheKey, CachedItinerary>>,
    ttl: Duration,
}

#[derive(Debug)]
struct CachedItinerary {
    itinerary: DisplayItinerary,
    stored_at: Instant,
}

fn cache_key(id: &str, config: &ExtractionConfig) -> CacheKey {
    (id.to_string(), serde_json::to_string(config).unwrap_or_default())
}

impl ItineraryCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh itinerary cached for `id` under `config`
    pub fn get(&self, id: &str, config: &ExtractionConfig) -> Option<DisplayItinerary> {
        let entries = self.entries.read().ok()?;
        entries
            .get(&cache_key(id, config))
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.itinerary.clone())
    }

    pub fn insert(&self, id: &str, config: &ExtractionConfig, itinerary: DisplayItinerary) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                cache_key(id, config),
                CachedItinerary {
                    itinerary,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every entry for `id`, whatever config it was assembled with
    pub fn invalidate(&self, id: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|(cached_id, _), _| cached_id != id);
        }
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, cached| cached.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached itinerary for the plan's id and `config`, assembling and storing
    /// it on a miss. Plans without an id are assembled every time.
    pub fn get_or_assemble(&self, raw: &RawPlan, config: &ExtractionConfig) -> DisplayItinerary {
        if raw.id.is_empty() {
            return assemble_with(raw, config);
        }
        if let Some(hit) = self.get(&raw.id, config) {
            debug!(id = %raw.id, "itinerary cache hit");
            return hit;
        }
        let itinerary = assemble_with(raw, config);
        self.insert(&raw.id, config, itinerary.clone());
        itinerary
    }

    /// Like [`get_or_assemble`](Self::get_or_assemble) with a fallible producer
    /// for when the raw plan still has to be fetched
    pub fn get_or_try_insert_with<E>(
        &self,
        id: &str,
        config: &ExtractionConfig,
        produce: impl FnOnce() -> Result<DisplayItinerary, E>,
    ) -> Result<DisplayItinerary, E> {
        if let Some(hit) = self.get(id, config) {
            return Ok(hit);
        }
        let itinerary = produce()?;
        self.insert(id, config, itinerary.clone());
        Ok(itinerary)
    }
}

impl Default for ItineraryCache {
    fn default() -> Self {
        Self::new()
    }
}
