//! Route segmentation.
//!
//! Walks the highway steps of a driving path, snaps sampled points to
//! catalogued service stations, and turns the sequence of stations passed
//! into a chain of costed legs from origin to destination.

use tracing::{debug, info};

use crate::catalog::StationCatalog;
use crate::domain::{LonLat, PathStep, Route, Station};
use crate::geo::{GeoMatcher, PathProvider};

use super::config::{SegmenterConfig, VehicleConfig};
use super::energy::EnergyModel;
use super::error::PlanError;

/// Splits a trip into station-to-station legs.
pub struct RouteSegmenter<'a, P> {
    catalog: &'a StationCatalog,
    paths: &'a P,
    config: &'a SegmenterConfig,
    vehicle: &'a VehicleConfig,
}

impl<'a, P: PathProvider> RouteSegmenter<'a, P> {
    pub fn new(
        catalog: &'a StationCatalog,
        paths: &'a P,
        config: &'a SegmenterConfig,
        vehicle: &'a VehicleConfig,
    ) -> Self {
        Self {
            catalog,
            paths,
            config,
            vehicle,
        }
    }

    /// Build the leg chain for the drive `start` → `end`.
    ///
    /// Samples are matched strictly in driving order: each match is
    /// disambiguated against the previously accepted station.
    pub async fn segment(&self, start: &Station, end: &Station) -> Result<Route, PlanError> {
        let path = self
            .paths
            .driving_path(start.location, end.location)
            .await
            .map_err(|e| PlanError::from_path_error(e, &start.name, &end.name))?;

        let matcher = GeoMatcher::new(self.catalog, self.paths, self.config.match_radius_m);
        let energy = EnergyModel::new(self.paths, self.vehicle);

        let mut legs = Vec::new();
        let mut prev = start.clone();

        for step in path.steps.iter().filter(|s| self.qualifies(s)) {
            for point in sample_points(step, self.config.sample_spacing_m) {
                let Some(found) = matcher.find_nearest(point, &step.regions, Some(&prev)).await?
                else {
                    continue;
                };
                if found.name == prev.name {
                    continue;
                }

                let leg = energy.leg_cost(&prev, &found).await?;
                debug!(
                    from = leg.start(),
                    to = leg.end(),
                    km = leg.distance_km(),
                    kwh = leg.consumed_battery_kwh(),
                    "leg"
                );
                legs.push(leg);
                prev = found;
            }
        }

        if prev.name != end.name {
            legs.push(energy.leg_cost(&prev, end).await?);
        }

        let route = Route::new(legs)?;
        info!(
            from = %start.name,
            to = %end.name,
            legs = route.len(),
            km = route.total_distance_km(),
            kwh = route.total_consumption_kwh(),
            "segmented route"
        );
        Ok(route)
    }

    /// Only highway steps long enough to hold a service area are sampled.
    fn qualifies(&self, step: &PathStep) -> bool {
        step.toll && step.distance_m >= self.config.min_step_m
    }
}

/// Points of `step` to test against the catalog, in driving order.
///
/// The first polyline vertex is skipped: it repeats the last vertex of the
/// previous step. The remaining vertices are strided so that samples land
/// roughly `spacing_m` apart. A step shorter than one spacing yields just
/// its first remaining vertex.
pub fn sample_points(step: &PathStep, spacing_m: f64) -> impl Iterator<Item = LonLat> + '_ {
    let points = step.polyline.get(1..).unwrap_or_default();
    let samples = if spacing_m > 0.0 {
        (step.distance_m / spacing_m).floor() as usize
    } else {
        points.len()
    };
    let stride = if samples == 0 {
        points.len().max(1)
    } else {
        (points.len() / samples).max(1)
    };
    points.iter().step_by(stride).copied()
}
