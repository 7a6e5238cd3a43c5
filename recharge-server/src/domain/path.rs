//! Driving path types.
//!
//! These are the provider-neutral shape of a driving route: the map client
//! converts its wire format into these, and the segmenter and energy model
//! consume them.

use super::LonLat;

/// An administrative region crossed by a path step, with the districts
/// of that region the step passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRef {
    /// Region (city/prefecture) name, e.g. "广州市".
    pub region: String,
    /// District names within the region, e.g. "黄埔区".
    pub districts: Vec<String>,
}

impl RegionRef {
    pub fn new(region: impl Into<String>, districts: Vec<String>) -> Self {
        Self {
            region: region.into(),
            districts,
        }
    }
}

/// One step of a driving path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Step length in metres.
    pub distance_m: f64,
    /// Whether the step runs on a toll road (highway).
    pub toll: bool,
    /// Estimated driving time in seconds.
    pub duration_s: f64,
    /// Step geometry, in driving order.
    pub polyline: Vec<LonLat>,
    /// Regions traversed, in driving order.
    pub regions: Vec<RegionRef>,
}

/// A complete driving path between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingPath {
    /// Total length in metres.
    pub distance_m: f64,
    /// Estimated total driving time in seconds.
    pub duration_s: f64,
    pub steps: Vec<PathStep>,
}

impl DrivingPath {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Length of the toll-road steps, in metres.
    pub fn toll_distance_m(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.toll)
            .map(|s| s.distance_m)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(distance_m: f64, toll: bool) -> PathStep {
        PathStep {
            distance_m,
            toll,
            duration_s: distance_m / 30.0,
            polyline: vec![],
            regions: vec![],
        }
    }

    #[test]
    fn toll_distance_sums_toll_steps() {
        let path = DrivingPath {
            distance_m: 4500.0,
            duration_s: 150.0,
            steps: vec![step(1000.0, false), step(3000.0, true), step(500.0, true)],
        };
        assert_eq!(path.toll_distance_m(), 3500.0);
        assert_eq!(path.distance_km(), 4.5);
    }
}
