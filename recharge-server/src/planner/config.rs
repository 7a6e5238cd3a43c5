//! Configuration for the recharge planner.
//!
//! The defaults are calibrated for a 59.5 kWh crossover driven on Chinese
//! expressways.

use crate::geo::DEFAULT_MATCH_RADIUS_M;

/// Physical parameters of the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    /// Usable battery capacity (kWh).
    pub max_battery_kwh: f64,

    /// Laden mass (kg).
    pub mass_kg: f64,

    /// Consumption on toll roads, cruising around 120 km/h (kWh/km).
    pub highway_kwh_per_km: f64,

    /// Consumption on other roads, cruising around 80 km/h (kWh/km).
    pub local_kwh_per_km: f64,

    /// DC charging power (kW).
    pub charge_rate_kw: f64,

    /// Fraction of charger energy that ends up in the battery.
    pub charge_efficiency: f64,

    /// State of charge the car must never drop below (percent).
    pub hard_min_soc_percent: f64,

    /// Fraction of descent energy recovered by regenerative braking.
    pub regen_efficiency: f64,

    /// Multiplier on the straight-slope gravity term. Accounts for the
    /// climbs and dips between two stations that the endpoint altitudes
    /// don't show.
    pub gravity_inflation: f64,
}

impl VehicleConfig {
    /// Convert a state of charge to stored energy.
    pub fn soc_to_kwh(&self, soc_percent: f64) -> f64 {
        soc_percent * 0.01 * self.max_battery_kwh
    }

    /// The lowest energy the battery may hold (kWh).
    pub fn floor_kwh(&self) -> f64 {
        self.soc_to_kwh(self.hard_min_soc_percent)
    }

    /// Minutes needed to charge from `before` to `after` percent, rounded up.
    pub fn recharge_minutes(&self, before_percent: f64, after_percent: f64) -> i64 {
        let drawn_kwh = self.soc_to_kwh(after_percent - before_percent) / self.charge_efficiency;
        (drawn_kwh / self.charge_rate_kw * 60.0).ceil() as i64
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_battery_kwh: 59.5,
            mass_kg: 2100.0,
            highway_kwh_per_km: 0.172,
            local_kwh_per_km: 0.14,
            charge_rate_kw: 70.0,
            charge_efficiency: 0.92,
            hard_min_soc_percent: 5.0,
            regen_efficiency: 0.25,
            gravity_inflation: 1.5,
        }
    }
}

/// How a driving path is sampled for stations.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterConfig {
    /// Target spacing between samples along a step (metres).
    pub sample_spacing_m: f64,

    /// Steps shorter than this are not sampled (metres).
    pub min_step_m: f64,

    /// A station matches a sample within this distance (metres).
    pub match_radius_m: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_spacing_m: 800.0,
            min_step_m: 500.0,
            match_radius_m: DEFAULT_MATCH_RADIUS_M,
        }
    }
}

/// How far a plan's figures may stray from the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances {
    pub arrival_min: i64,
    pub soc_kwh: f64,
    pub recharge_min: i64,
    pub departure_min: i64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            arrival_min: 2,
            soc_kwh: 1.0,
            recharge_min: 2,
            departure_min: 2,
        }
    }
}

/// Everything the planning loop needs besides its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub vehicle: VehicleConfig,
    pub segmenter: SegmenterConfig,
    pub tolerances: Tolerances,

    /// Generation attempts before giving up.
    pub max_retries: usize,
}

impl PlannerConfig {
    /// Set the retry bound.
    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            segmenter: SegmenterConfig::default(),
            tolerances: Tolerances::default(),
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.vehicle.max_battery_kwh, 59.5);
        assert_eq!(config.vehicle.hard_min_soc_percent, 5.0);
        assert_eq!(config.vehicle.regen_efficiency, 0.25);
        assert_eq!(config.segmenter.sample_spacing_m, 800.0);
        assert_eq!(config.segmenter.min_step_m, 500.0);
        assert_eq!(config.segmenter.match_radius_m, 500.0);
        assert_eq!(config.tolerances.arrival_min, 2);
        assert_eq!(config.tolerances.soc_kwh, 1.0);
    }

    #[test]
    fn floor_is_exact_fraction_of_capacity() {
        let vehicle = VehicleConfig::default();
        assert!((vehicle.floor_kwh() - 2.975).abs() < 1e-9);
        assert!((vehicle.soc_to_kwh(50.0) - 29.75).abs() < 1e-9);
    }

    #[test]
    fn recharge_minutes_rounds_up() {
        let vehicle = VehicleConfig::default();
        // 20% → 80%: 35.7 kWh / 0.92 / 70 kW = 33.26 min
        assert_eq!(vehicle.recharge_minutes(20.0, 80.0), 34);
        assert_eq!(vehicle.recharge_minutes(50.0, 50.0), 0);
    }

    #[test]
    fn custom_retries() {
        let config = PlannerConfig::default().with_max_retries(5);
        assert_eq!(config.max_retries, 5);
    }
}
