//! Snap path samples to catalogued service stations.

use tracing::{debug, trace, warn};

use crate::amap::MapError;
use crate::catalog::StationCatalog;
use crate::domain::{LonLat, RegionRef, Station, StationGroup};

use super::haversine::haversine_m;
use super::provider::PathProvider;

/// Default match radius in metres.
pub const DEFAULT_MATCH_RADIUS_M: f64 = 500.0;

/// Error from station matching.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The path crosses a region the catalog has no data for.
    #[error("no service-station data for region {region}")]
    CoverageGap { region: String },

    /// Fetching a disambiguation path failed.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Finds the catalog station nearest to a point on a driving path.
pub struct GeoMatcher<'a, P> {
    catalog: &'a StationCatalog,
    paths: &'a P,
    radius_m: f64,
}

impl<'a, P: PathProvider> GeoMatcher<'a, P> {
    pub fn new(catalog: &'a StationCatalog, paths: &'a P, radius_m: f64) -> Self {
        Self {
            catalog,
            paths,
            radius_m,
        }
    }

    /// Match `point` to a station in one of the regions the path crosses.
    ///
    /// Regions are searched in order and only the districts listed for each
    /// are scanned; the first station within the radius wins. The match is
    /// then collapsed to its station group: with a `reference`, the member
    /// with the shortest driving distance from the reference is returned,
    /// so a sample on one carriageway is not snapped to the opposite one.
    ///
    /// Returns `Ok(None)` when nothing is in range.
    pub async fn find_nearest(
        &self,
        point: LonLat,
        regions: &[RegionRef],
        reference: Option<&Station>,
    ) -> Result<Option<Station>, MatchError> {
        for region in regions {
            let Some(accepted) = self.within_radius(point, region)? else {
                continue;
            };
            trace!(%point, station = %accepted.name, region = %region.region, "sample matched");

            let group = self.catalog.group(&region.region, accepted);
            let chosen = match reference {
                Some(reference) if group.len() > 1 => self.closest_by_path(&group, reference).await?,
                _ => accepted.clone(),
            };
            return Ok(Some(chosen));
        }
        Ok(None)
    }

    /// First station of `region` within the match radius of `point`.
    fn within_radius(
        &self,
        point: LonLat,
        region: &RegionRef,
    ) -> Result<Option<&'a Station>, MatchError> {
        let catalog = self.catalog;
        if !catalog.covers(&region.region) {
            return Err(MatchError::CoverageGap {
                region: region.region.clone(),
            });
        }

        let found = region
            .districts
            .iter()
            .filter_map(|district| catalog.lookup(&region.region, district))
            .flatten()
            .find(|station| haversine_m(point, station.location) <= self.radius_m);
        Ok(found)
    }

    /// The group member with the shortest driving distance from `reference`.
    ///
    /// Ties keep the earlier member, so the anchor wins a tie. Members with
    /// no route from the reference are skipped.
    async fn closest_by_path(
        &self,
        group: &StationGroup,
        reference: &Station,
    ) -> Result<Station, MatchError> {
        let mut best: Option<(&Station, f64)> = None;
        for member in group.members() {
            let distance_m = match self
                .paths
                .driving_path(reference.location, member.location)
                .await
            {
                Ok(path) => path.distance_m,
                Err(MapError::NoRoute { .. }) => {
                    warn!(from = %reference.name, to = %member.name, "no route to group member");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if best.is_none_or(|(_, d)| distance_m < d) {
                best = Some((member, distance_m));
            }
        }

        let chosen = best.map_or(group.anchor(), |(s, _)| s);
        debug!(
            group = group.key(),
            members = group.len(),
            reference = %reference.name,
            chosen = %chosen.name,
            "resolved station group"
        );
        Ok(chosen.clone())
    }
}
