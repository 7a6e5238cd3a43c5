//! Caching layer for AMap responses.
//!
//! Segmenting one trip asks for the same station-to-station paths many
//! times (group disambiguation, then leg costing), and concurrent trips
//! along the same corridor repeat them again. Paths and geocodes are
//! memoised in bounded TTL caches keyed by their exact query.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::amap::{AmapClient, MapError};
use crate::domain::{DrivingPath, LonLat};
use crate::geo::{Geocoder, PathProvider};

/// Cache key for paths: origin and destination in wire format.
type PathKey = (String, String);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached paths.
    pub max_paths: u64,

    /// Maximum number of cached geocodes.
    pub max_geocodes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_paths: 10_000,
            max_geocodes: 1_000,
        }
    }
}

/// Cache for AMap responses.
pub struct MapCache {
    paths: MokaCache<PathKey, Arc<DrivingPath>>,
    geocodes: MokaCache<String, LonLat>,
}

impl MapCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let paths = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_paths)
            .build();
        let geocodes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_geocodes)
            .build();

        Self { paths, geocodes }
    }

    fn path_key(from: LonLat, to: LonLat) -> PathKey {
        (from.to_string(), to.to_string())
    }

    pub async fn get_path(&self, from: LonLat, to: LonLat) -> Option<Arc<DrivingPath>> {
        self.paths.get(&Self::path_key(from, to)).await
    }

    pub async fn insert_path(&self, from: LonLat, to: LonLat, path: Arc<DrivingPath>) {
        self.paths.insert(Self::path_key(from, to), path).await;
    }

    pub async fn get_geocode(&self, address: &str) -> Option<LonLat> {
        self.geocodes.get(address).await
    }

    pub async fn insert_geocode(&self, address: &str, location: LonLat) {
        self.geocodes.insert(address.to_string(), location).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.paths.entry_count() + self.geocodes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.paths.invalidate_all();
        self.geocodes.invalidate_all();
    }
}

/// AMap client with caching.
///
/// Wraps an `AmapClient` and caches successful path and geocode answers.
/// Failures are not cached.
pub struct CachedMapClient {
    client: AmapClient,
    cache: MapCache,
}

impl CachedMapClient {
    /// Create a new cached client.
    pub fn new(client: AmapClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: MapCache::new(cache_config),
        }
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl PathProvider for CachedMapClient {
    async fn driving_path(&self, from: LonLat, to: LonLat) -> Result<Arc<DrivingPath>, MapError> {
        if let Some(cached) = self.cache.get_path(from, to).await {
            trace!(%from, %to, "path cache hit");
            return Ok(cached);
        }

        let path = Arc::new(self.client.fetch_driving_path(from, to).await?);
        self.cache.insert_path(from, to, path.clone()).await;
        Ok(path)
    }
}

impl Geocoder for CachedMapClient {
    async fn geocode(&self, address: &str) -> Result<LonLat, MapError> {
        if let Some(cached) = self.cache.get_geocode(address).await {
            trace!(address, "geocode cache hit");
            return Ok(cached);
        }

        let location = self.client.fetch_geocode(address).await?;
        self.cache.insert_geocode(address, location).await;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lon: f64, lat: f64) -> LonLat {
        LonLat::new(lon, lat).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_paths, 10_000);
        assert_eq!(config.max_geocodes, 1_000);
    }

    #[test]
    fn path_key_is_directional() {
        let a = pt(113.1, 23.1);
        let b = pt(113.2, 23.2);
        assert_ne!(MapCache::path_key(a, b), MapCache::path_key(b, a));
        assert_eq!(MapCache::path_key(a, b), MapCache::path_key(a, b));
    }

    #[tokio::test]
    async fn stores_and_returns_paths() {
        let cache = MapCache::new(&CacheConfig::default());
        let a = pt(113.1, 23.1);
        let b = pt(113.2, 23.2);
        assert!(cache.get_path(a, b).await.is_none());

        let path = Arc::new(DrivingPath {
            distance_m: 1000.0,
            duration_s: 60.0,
            steps: vec![],
        });
        cache.insert_path(a, b, path.clone()).await;

        let cached = cache.get_path(a, b).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &path));
        assert!(cache.get_path(b, a).await.is_none());
    }

    #[tokio::test]
    async fn stores_and_returns_geocodes() {
        let cache = MapCache::new(&CacheConfig::default());
        assert!(cache.get_geocode("广州市黄埔区").await.is_none());

        let location = pt(113.459749, 23.106402);
        cache.insert_geocode("广州市黄埔区", location).await;
        assert_eq!(cache.get_geocode("广州市黄埔区").await, Some(location));

        cache.invalidate_all();
        assert!(cache.get_geocode("广州市黄埔区").await.is_none());
    }

    #[test]
    fn cached_client_starts_empty() {
        let client = AmapClient::new(crate::amap::AmapConfig::new("test-key")).unwrap();
        let cached = CachedMapClient::new(client, &CacheConfig::default());
        assert_eq!(cached.cache_entry_count(), 0);
    }
}
