//! Energy and time cost of a station-to-station leg.
//!
//! Consumption is a per-kilometre rate that depends on the road class,
//! plus a gravity term from the altitude difference between the two
//! stations. Climbing pays the full gravity term; descending recovers
//! only part of it through regeneration.

use crate::domain::{DomainError, DrivingPath, Leg, Station};
use crate::geo::PathProvider;

use super::config::VehicleConfig;
use super::error::PlanError;

/// Standard gravity (m/s²).
const GRAVITY_M_S2: f64 = 9.8;

const JOULES_PER_KWH: f64 = 3.6e6;

/// The map provider's durations are pessimistic; scale them down.
const DURATION_FACTOR: f64 = 0.9;

/// Time spent leaving and re-entering the highway at a service area.
const STATION_OVERHEAD_S: f64 = 90.0;

/// Altitude difference above which a leg is tagged.
const ALTITUDE_TAG_THRESHOLD_M: f64 = 300.0;

pub const CLIMB_TAG: &str = "altitude climb over 300m";
pub const DESCENT_TAG: &str = "altitude descent over 300m";

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Consumption from distance alone, ignoring altitude.
///
/// Toll steps use the highway rate and other steps the local-road rate. A
/// path without step detail is costed at the highway rate.
pub fn base_consumption_kwh(path: &DrivingPath, vehicle: &VehicleConfig) -> f64 {
    if path.steps.is_empty() {
        return path.distance_km() * vehicle.highway_kwh_per_km;
    }

    path.steps
        .iter()
        .map(|step| {
            let rate = if step.toll {
                vehicle.highway_kwh_per_km
            } else {
                vehicle.local_kwh_per_km
            };
            step.distance_m / 1000.0 * rate
        })
        .sum()
}

/// Energy to lift (or recovered from lowering) the car by
/// `altitude_diff_m` over `distance_km`.
///
/// Positive when climbing. When descending the result is negative and
/// already scaled by the regeneration efficiency.
pub fn gravity_kwh(distance_km: f64, altitude_diff_m: f64, vehicle: &VehicleConfig) -> f64 {
    if distance_km <= 0.0 {
        return 0.0;
    }

    let d = distance_km * 1000.0;
    let slope = altitude_diff_m / d;
    let force = vehicle.mass_kg * GRAVITY_M_S2 * slope.atan().sin();
    let energy = vehicle.gravity_inflation * force * d / JOULES_PER_KWH;

    if altitude_diff_m >= 0.0 {
        energy
    } else {
        energy * vehicle.regen_efficiency
    }
}

/// Driving minutes for a provider duration, net of the station overhead.
pub fn driving_minutes(duration_s: f64) -> u32 {
    let minutes = ((duration_s * DURATION_FACTOR - STATION_OVERHEAD_S) / 60.0).ceil();
    minutes.max(0.0) as u32
}

/// Cost the leg `from` → `to` along `path`.
///
/// Pure: identical inputs give an identical leg.
pub fn cost_for_path(
    from: &Station,
    to: &Station,
    path: &DrivingPath,
    vehicle: &VehicleConfig,
) -> Result<Leg, DomainError> {
    let distance_km = round_to(path.distance_km(), 1);
    let mut kwh = base_consumption_kwh(path, vehicle);
    let mut tags = Vec::new();

    if let (Some(from_alt), Some(to_alt)) = (from.altitude, to.altitude) {
        let diff = to_alt - from_alt;
        kwh += gravity_kwh(distance_km, diff, vehicle);
        if diff > ALTITUDE_TAG_THRESHOLD_M {
            tags.push(CLIMB_TAG.to_string());
        }
        if diff < -ALTITUDE_TAG_THRESHOLD_M {
            tags.push(DESCENT_TAG.to_string());
        }
    }

    Leg::new(
        &from.name,
        &to.name,
        distance_km,
        driving_minutes(path.duration_s),
        round_to(kwh, 2),
        tags,
    )
}

/// Costs legs by fetching the driving path between their stations.
pub struct EnergyModel<'a, P> {
    paths: &'a P,
    vehicle: &'a VehicleConfig,
}

impl<'a, P: PathProvider> EnergyModel<'a, P> {
    pub fn new(paths: &'a P, vehicle: &'a VehicleConfig) -> Self {
        Self { paths, vehicle }
    }

    /// Fetch the path `from` → `to` and cost it.
    pub async fn leg_cost(&self, from: &Station, to: &Station) -> Result<Leg, PlanError> {
        let path = self
            .paths
            .driving_path(from.location, to.location)
            .await
            .map_err(|e| PlanError::from_path_error(e, &from.name, &to.name))?;
        Ok(cost_for_path(from, to, &path, self.vehicle)?)
    }
}
