//! Catalog loading from JSON.
//!
//! The document shape is `{ region: { district: [ {name, location, altitude} ] } }`.

use std::path::Path;

use super::error::CatalogError;
use super::index::{RegionIndex, StationCatalog};

/// Service areas along the Guangdong, Guangxi and Guizhou highway corridor.
const BUNDLED_CATALOG: &str = include_str!("../../data/stations.json");

impl StationCatalog {
    /// Parse a catalog from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let regions: RegionIndex = serde_json::from_str(json).map_err(|e| CatalogError::Json {
            message: e.to_string(),
        })?;
        Self::new(regions)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }
}
