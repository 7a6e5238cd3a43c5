//! Map data seams.
//!
//! The matcher, segmenter and planning loop depend on these traits rather
//! than on the HTTP client, so they can be tested with in-memory data.

use std::future::Future;
use std::sync::Arc;

use crate::amap::MapError;
use crate::domain::{DrivingPath, LonLat};

/// Source of driving paths.
pub trait PathProvider: Send + Sync {
    /// The driving path from `from` to `to`.
    ///
    /// Fails with [`MapError::NoRoute`] when the points are not connected.
    fn driving_path(
        &self,
        from: LonLat,
        to: LonLat,
    ) -> impl Future<Output = Result<Arc<DrivingPath>, MapError>> + Send;
}

/// Address to coordinate resolution.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<LonLat, MapError>> + Send;
}
