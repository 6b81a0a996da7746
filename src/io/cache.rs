//! Timestamped cache entries with expiration over a [`KeyValueStore`]
//!
//! Every failure on this path (storage errors, malformed JSON, shape
//! mismatches) is logged and reported as a miss. Callers never see an error.

use super::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Raw directory payload.
pub const DIRECTORY_CACHE_KEY: &str = "orgChartDataCache_v1";
/// UI state snapshot.
pub const UI_STATE_CACHE_KEY: &str = "orgChartUiState_v1";
/// Expansion state of the standalone tree view.
pub const TREE_EXPANSION_CACHE_KEY: &str = "orgTreeExpandedIds";

/// Freshness window for UI state snapshots.
pub const UI_STATE_TTL: Duration = Duration::from_secs(60);
/// Freshness window for the raw directory payload.
pub const DIRECTORY_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Source of the current time in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, millis)
    }
}

/// Hand-driven clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    #[must_use]
    pub fn at(now_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(millis(by)));
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// How long a cached entry stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    /// Expires once its age reaches the duration; a zero duration is always expired.
    After(Duration),
}

impl Default for Expiry {
    fn default() -> Self {
        Expiry::After(UI_STATE_TTL)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope<T> {
    timestamp: i64,
    data: T,
}

/// Expiring cache layered on a string store.
#[derive(Debug)]
pub struct CacheStore<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> CacheStore<S, SystemClock> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> CacheStore<S, C> {
    #[must_use]
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Store `data` under `key` stamped with the current time.
    ///
    /// Returns whether the write succeeded.
    pub fn set<T: Serialize>(&mut self, key: &str, data: &T) -> bool {
        let envelope = CacheEnvelope {
            timestamp: self.clock.now_ms(),
            data,
        };
        let text = match serde_json::to_string(&envelope) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Failed to serialize cache entry '{key}': {err}");
                return false;
            }
        };
        match self.store.set(key, text) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to write cache entry '{key}': {err}");
                false
            }
        }
    }

    /// Read `key`; absent, unreadable or expired entries yield `None`.
    ///
    /// Expired entries are evicted.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str, expiry: Expiry) -> Option<T> {
        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Failed to read cache entry '{key}': {err}");
                return None;
            }
        };

        let envelope: CacheEnvelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(err) => {
                log::warn!("Ignoring malformed cache entry '{key}': {err}");
                return None;
            }
        };

        if let Expiry::After(ttl) = expiry {
            let age = self.clock.now_ms().saturating_sub(envelope.timestamp);
            if age >= millis(ttl) {
                log::debug!("Cache entry '{key}' expired ({age} ms old)");
                self.remove(key);
                return None;
            }
        }

        log::debug!("Cache hit for '{key}'");
        Some(envelope.data)
    }

    /// Evict `key` unconditionally.
    pub fn remove(&mut self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            log::warn!("Failed to remove cache entry '{key}': {err}");
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
