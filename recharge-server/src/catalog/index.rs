//! Region → district → station index.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{Station, StationGroup};

use super::error::CatalogError;

/// Stations of one region, keyed by district name.
pub type DistrictIndex = BTreeMap<String, Vec<Station>>;

/// Districts keyed by region name.
pub type RegionIndex = BTreeMap<String, DistrictIndex>;

/// Read-only lookup of known service stations.
///
/// Loaded once at startup and shared behind an `Arc`; there are no
/// mutating operations, so concurrent readers need no locking.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    regions: RegionIndex,
}

impl StationCatalog {
    /// Build a catalog, checking that station names are unique per district.
    pub fn new(regions: RegionIndex) -> Result<Self, CatalogError> {
        for (region, districts) in &regions {
            for (district, stations) in districts {
                let mut seen = HashSet::with_capacity(stations.len());
                for station in stations {
                    if !seen.insert(station.name.as_str()) {
                        return Err(CatalogError::DuplicateStation {
                            region: region.clone(),
                            district: district.clone(),
                            name: station.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { regions })
    }

    /// Stations of one district, or `None` if either key is unknown.
    pub fn lookup(&self, region: &str, district: &str) -> Option<&[Station]> {
        self.regions
            .get(region)
            .and_then(|districts| districts.get(district))
            .map(Vec::as_slice)
    }

    /// All districts of a region, or `None` if the region isn't covered.
    pub fn region(&self, region: &str) -> Option<&DistrictIndex> {
        self.regions.get(region)
    }

    /// True if the catalog has data for `region`.
    pub fn covers(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    /// The directional siblings of `station` within `region`.
    ///
    /// An unknown region yields a group holding only `station`.
    pub fn group(&self, region: &str, station: &Station) -> StationGroup {
        let pool = self
            .regions
            .get(region)
            .into_iter()
            .flat_map(|districts| districts.values())
            .flatten();
        StationGroup::collect(station, pool)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn station_count(&self) -> usize {
        self.regions
            .values()
            .flat_map(|d| d.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.station_count() == 0
    }
}
