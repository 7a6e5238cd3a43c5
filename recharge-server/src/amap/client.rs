//! AMap REST HTTP client.
//!
//! Provides async methods for driving-path retrieval and address
//! geocoding. Handles the API key, concurrency limiting, and conversion
//! to domain types.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{DrivingPath, LonLat};
use crate::geo::{Geocoder, PathProvider};

use super::convert::{geocode_location, select_path};
use super::error::MapError;
use super::types::{DrivingResponse, Envelope, GeocodeResponse};

/// Default base URL for the AMap web service API.
const DEFAULT_BASE_URL: &str = "https://restapi.amap.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Route strategy 32: the provider's default recommended route.
const DRIVING_STRATEGY: &str = "32";

/// Optional fields requested for each driving step.
const DRIVING_FIELDS: &str = "cost,polyline,cities";

/// Configuration for the AMap client.
#[derive(Debug, Clone)]
pub struct AmapConfig {
    /// Web service key
    pub api_key: String,
    /// Base URL for the API (defaults to production AMap)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AmapConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// AMap web service client.
///
/// Uses a semaphore to limit concurrent requests; AMap keys carry a low
/// per-second quota.
#[derive(Debug, Clone)]
pub struct AmapClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl AmapClient {
    /// Create a new AMap client with the given configuration.
    pub fn new(config: AmapConfig) -> Result<Self, MapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch the fastest driving path between two points.
    pub async fn fetch_driving_path(
        &self,
        from: LonLat,
        to: LonLat,
    ) -> Result<DrivingPath, MapError> {
        let response: DrivingResponse = self
            .get(
                "/v5/direction/driving",
                &[
                    ("origin", from.to_string()),
                    ("destination", to.to_string()),
                    ("strategy", DRIVING_STRATEGY.to_string()),
                    ("show_fields", DRIVING_FIELDS.to_string()),
                ],
            )
            .await?;

        check_envelope(&response.envelope)?;
        if response.envelope.result_count() == 0 {
            return Err(MapError::NoRoute { from, to });
        }

        let route = response.route.ok_or(MapError::NoRoute { from, to })?;
        let path = select_path(&route)?.ok_or(MapError::NoRoute { from, to })?;

        debug!(
            %from,
            %to,
            distance_m = path.distance_m,
            duration_s = path.duration_s,
            steps = path.steps.len(),
            "fetched driving path"
        );
        Ok(path)
    }

    /// Resolve a free-form address to a coordinate.
    pub async fn fetch_geocode(&self, address: &str) -> Result<LonLat, MapError> {
        let response: GeocodeResponse = self
            .get("/v3/geocode/geo", &[("address", address.to_string())])
            .await?;

        check_envelope(&response.envelope)?;
        let no_geocode = || MapError::NoGeocode {
            address: address.to_string(),
        };
        if response.envelope.result_count() == 0 {
            return Err(no_geocode());
        }

        let location = geocode_location(&response)?.ok_or_else(no_geocode)?;
        debug!(address, %location, "geocoded address");
        Ok(location)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MapError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MapError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str()), ("output", "json")])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MapError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MapError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Map a non-success AMap status into an error.
fn check_envelope(envelope: &Envelope) -> Result<(), MapError> {
    if envelope.is_ok() {
        return Ok(());
    }

    let info = envelope.info.as_str().unwrap_or("unknown").to_string();
    let infocode = envelope.infocode.as_str().unwrap_or("").to_string();
    warn!(%info, %infocode, "map service rejected request");

    // 1002x codes are quota and QPS limits.
    if infocode.starts_with("1002") {
        return Err(MapError::RateLimited);
    }
    Err(MapError::Rejected { info, infocode })
}

impl PathProvider for AmapClient {
    async fn driving_path(&self, from: LonLat, to: LonLat) -> Result<Arc<DrivingPath>, MapError> {
        self.fetch_driving_path(from, to).await.map(Arc::new)
    }
}

impl Geocoder for AmapClient {
    async fn geocode(&self, address: &str) -> Result<LonLat, MapError> {
        self.fetch_geocode(address).await
    }
}
