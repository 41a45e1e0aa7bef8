//! Result cache keyed by string, holding JSON values

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Key/value store for computed results
///
/// Implementations must be safe to miss: a failed `get` is just a miss and a
/// failed `set` is dropped.
pub trait CacheProvider {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Duration);
    fn invalidate(&self, key: &str);
}

/// Never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl CacheProvider for NoopCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}

    fn invalidate(&self, _key: &str) {}
}

/// In-process cache with per-entry expiry
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, Value)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|(expires, _)| *expires > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheProvider for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let (expires, value) = entries.get(key)?;
        if *expires > Instant::now() {
            return Some(value.clone());
        }
        entries.remove(key);
        None
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let expires = Instant::now() + ttl;
        self.lock().insert(key.to_string(), (expires, value));
    }

    fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// A value and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cached<T> {
    pub data: T,
    pub from_cache: bool,
    /// Time spent in `compute`; `None` on a hit
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_millis")]
    pub compute_time: Option<Duration>,
}

fn serialize_millis<S: serde::Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_f64(d.as_secs_f64() * 1000.0),
        None => serializer.serialize_none(),
    }
}

/// Return the cached value for `key`, or compute, store and return it
///
/// An entry that no longer deserializes as `T` is treated as a miss.
pub fn get_or_compute<C, T, F>(cache: &C, key: &str, ttl: Duration, compute: F) -> Cached<T>
where
    C: CacheProvider + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if let Some(value) = cache.get(key) {
        match serde_json::from_value::<T>(value) {
            Ok(data) => {
                debug!("cache hit for {}", key);
                return Cached {
                    data,
                    from_cache: true,
                    compute_time: None,
                };
            }
            Err(e) => {
                warn!("discarding unreadable cache entry {}: {}", key, e);
                cache.invalidate(key);
            }
        }
    }

    let started = Instant::now();
    let data = compute();
    let compute_time = started.elapsed();

    match serde_json::to_value(&data) {
        Ok(value) => cache.set(key, value, ttl),
        Err(e) => warn!("result for {} not cached: {}", key, e),
    }
    debug!("cache miss for {}, computed in {:?}", key, compute_time);

    Cached {
        data,
        from_cache: false,
        compute_time: Some(compute_time),
    }
}
