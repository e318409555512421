//! In-memory store implementation
//!
//! Used for testing and local runs without Redis.
//! Thread-safe using RwLock for concurrent access. Expiry is lazy: expired
//! values are invisible to reads and dropped on the next write.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use geotask_domain::Point;
use tokio::time::Instant;

use crate::error::StoreError;
use crate::geo::{haversine_distance, DistanceUnit, GeoHit, GeoStore};

/// Value with optional deadline
struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// In-memory store for testing
pub struct MemoryStore {
    values: RwLock<HashMap<String, Entry>>,
    sorted_sets: RwLock<HashMap<String, HashMap<String, f64>>>,
    geo_indexes: RwLock<HashMap<String, HashMap<String, Point>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            sorted_sets: RwLock::new(HashMap::new()),
            geo_indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live (non-expired) values
    pub fn value_count(&self) -> usize {
        let now = Instant::now();
        read(&self.values).map(|v| v.values().filter(|e| e.is_live(now)).count()).unwrap_or(0)
    }

    /// Number of members in a geo index
    pub fn geo_count(&self, index: &str) -> usize {
        read(&self.geo_indexes).map(|g| g.get(index).map_or(0, HashMap::len)).unwrap_or(0)
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) -> Result<(), StoreError> {
        write(&self.values)?.clear();
        write(&self.sorted_sets)?.clear();
        write(&self.geo_indexes)?.clear();
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
}

fn in_range(score: f64, min: f64, max: f64) -> bool {
    score >= min && score <= max
}

// =============================================================================
// GeoStore Implementation
// =============================================================================

#[async_trait]
impl GeoStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let values = read(&self.values)?;
        Ok(values.get(key).filter(|e| e.is_live(now)).map(|e| e.data.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut values = write(&self.values)?;
        values.retain(|_, e| e.is_live(now));
        values.insert(
            key.to_string(),
            Entry {
                data: value.to_vec(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut values = write(&self.values)?;

        let current = match values.get(key).filter(|e| e.is_live(now)) {
            Some(entry) => std::str::from_utf8(&entry.data)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| StoreError::Database(format!("{} is not an integer", key)))?,
            None => 0,
        };

        let next = current + 1;
        let expires_at = values.get(key).and_then(|e| e.expires_at).filter(|d| *d > now);
        values.insert(
            key.to_string(),
            Entry {
                data: next.to_string().into_bytes(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn geo_add(&self, index: &str, member: &str, point: Point) -> Result<(), StoreError> {
        let mut indexes = write(&self.geo_indexes)?;
        indexes.entry(index.to_string()).or_default().insert(member.to_string(), point);
        Ok(())
    }

    async fn geo_radius(
        &self,
        index: &str,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<GeoHit>, StoreError> {
        let indexes = read(&self.geo_indexes)?;
        let Some(members) = indexes.get(index) else {
            return Ok(Vec::new());
        };

        let scale = unit.meters();
        let mut hits: Vec<GeoHit> = members
            .iter()
            .map(|(member, point)| GeoHit {
                member: member.clone(),
                point: *point,
                distance: haversine_distance(center, *point) / scale,
            })
            .filter(|hit| hit.distance <= radius)
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut sets = write(&self.sorted_sets)?;
        sets.entry(set.to_string()).or_default().insert(member.to_string(), score);
        Ok(())
    }

    async fn zrange_by_score(&self, set: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError> {
        let sets = read(&self.sorted_sets)?;
        let Some(members) = sets.get(set) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<(&String, f64)> = members
            .iter()
            .filter(|(_, score)| in_range(**score, min, max))
            .map(|(member, score)| (member, *score))
            .collect();
        matching.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        Ok(matching.into_iter().map(|(member, _)| member.clone()).collect())
    }

    async fn zrem(&self, set: &str, members: &[String]) -> Result<(), StoreError> {
        {
            let mut sets = write(&self.sorted_sets)?;
            if let Some(existing) = sets.get_mut(set) {
                for member in members {
                    existing.remove(member);
                }
            }
        }

        let mut indexes = write(&self.geo_indexes)?;
        if let Some(existing) = indexes.get_mut(set) {
            for member in members {
                existing.remove(member);
            }
        }
        Ok(())
    }

    async fn zrem_range_by_score(&self, set: &str, min: f64, max: f64) -> Result<(), StoreError> {
        let mut sets = write(&self.sorted_sets)?;
        if let Some(existing) = sets.get_mut(set) {
            existing.retain(|_, score| !in_range(*score, min, max));
        }
        Ok(())
    }

    async fn zcard(&self, set: &str) -> Result<i64, StoreError> {
        let scored = read(&self.sorted_sets)?.get(set).map_or(0, HashMap::len);
        let indexed = read(&self.geo_indexes)?.get(set).map_or(0, HashMap::len);
        Ok((scored + indexed) as i64)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();

        store.set("k", b"v", None).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.value_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_expires_after_ttl() {
        let store = MemoryStore::new();
        store.set("k", b"v", Some(Duration::from_secs(120))).await.unwrap();

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(store.value_count(), 0);
    }

    #[tokio::test]
    async fn test_incr_starts_at_one() {
        let store = MemoryStore::new();

        assert_eq!(store.incr("order:id").await.unwrap(), 1);
        assert_eq!(store.incr("order:id").await.unwrap(), 2);
        assert_eq!(store.incr("order:id").await.unwrap(), 3);
        assert_eq!(store.get("order:id").await.unwrap(), Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_incr_rejects_non_integer() {
        let store = MemoryStore::new();
        store.set("k", b"abc", None).await.unwrap();

        assert!(matches!(store.incr("k").await, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_geo_radius_filters_and_sorts() {
        let store = MemoryStore::new();
        let center = Point::new(59.9300, 30.3600);

        store.geo_add("idx", "far", Point::new(59.9400, 30.3600)).await.unwrap(); // ~1.1 km
        store.geo_add("idx", "near", Point::new(59.9305, 30.3600)).await.unwrap(); // ~56 m
        store.geo_add("idx", "out", Point::new(60.0000, 30.3600)).await.unwrap(); // ~7.8 km

        let hits = store.geo_radius("idx", center, 2.0, DistanceUnit::Kilometers).await.unwrap();

        let names: Vec<&str> = hits.iter().map(|h| h.member.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
        assert!(hits.iter().all(|h| h.distance <= 2.0));
    }

    #[tokio::test]
    async fn test_geo_radius_unknown_index_is_empty() {
        let store = MemoryStore::new();

        let hits = store.geo_radius("missing", Point::new(0.0, 0.0), 100.0, DistanceUnit::Meters).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_sorted_set_range_and_remove() {
        let store = MemoryStore::new();
        store.zadd("s", "a", 10.0).await.unwrap();
        store.zadd("s", "b", 20.0).await.unwrap();
        store.zadd("s", "c", 30.0).await.unwrap();

        let range = store.zrange_by_score("s", f64::NEG_INFINITY, 20.0).await.unwrap();
        assert_eq!(range, vec!["a".to_string(), "b".to_string()]);

        store.zrem_range_by_score("s", f64::NEG_INFINITY, 20.0).await.unwrap();
        assert_eq!(store.zcard("s").await.unwrap(), 1);

        store.zrem("s", &["c".to_string(), "ghost".to_string()]).await.unwrap();
        assert_eq!(store.zcard("s").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zrem_prunes_geo_index() {
        let store = MemoryStore::new();
        store.geo_add("idx", "a", Point::new(1.0, 1.0)).await.unwrap();
        store.geo_add("idx", "b", Point::new(1.0, 1.0)).await.unwrap();

        store.zrem("idx", &["a".to_string()]).await.unwrap();

        assert_eq!(store.geo_count("idx"), 1);
        assert_eq!(store.zcard("idx").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        store.set("k", b"v", None).await.unwrap();
        store.zadd("s", "a", 1.0).await.unwrap();
        store.geo_add("idx", "a", Point::new(1.0, 1.0)).await.unwrap();

        store.clear().unwrap();

        assert_eq!(store.value_count(), 0);
        assert_eq!(store.zcard("s").await.unwrap(), 0);
        assert_eq!(store.geo_count("idx"), 0);
    }
}
