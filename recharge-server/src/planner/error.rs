//! Planner error types.

use crate::amap::MapError;
use crate::domain::DomainError;
use crate::generator::GeneratorError;
use crate::geo::MatchError;

/// Error from segmenting a route or planning a trip.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The map provider has no driving route between the two places.
    #[error("no driving route from {from} to {to}")]
    RouteUnavailable { from: String, to: String },

    /// The route crosses a region the station catalog doesn't cover.
    #[error("no service-station data for region {region}")]
    DataCoverageGap { region: String },

    /// An address could not be resolved to a location.
    #[error("could not locate address {address:?}")]
    Geocode { address: String },

    /// Every generated plan failed verification.
    #[error("no valid plan after {attempts} attempts: {last_diagnostic}")]
    MaxRetriesExceeded {
        attempts: usize,
        last_diagnostic: String,
    },

    /// The generator declined to produce a plan.
    #[error("no plan produced: {reason}")]
    NoPlanProduced { reason: String },

    #[error("map service error: {0}")]
    Map(#[source] MapError),

    #[error("plan generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<MatchError> for PlanError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::CoverageGap { region } => PlanError::DataCoverageGap { region },
            MatchError::Map(e) => PlanError::Map(e),
        }
    }
}

impl PlanError {
    /// Wrap a path lookup failure, naming the stations involved.
    pub(crate) fn from_path_error(err: MapError, from: &str, to: &str) -> Self {
        match err {
            MapError::NoRoute { .. } => PlanError::RouteUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            },
            other => PlanError::Map(other),
        }
    }

    /// Wrap a geocoding failure.
    pub(crate) fn from_geocode_error(err: MapError, address: &str) -> Self {
        match err {
            MapError::NoGeocode { .. } => PlanError::Geocode {
                address: address.to_string(),
            },
            other => PlanError::Map(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LonLat;

    #[test]
    fn error_display() {
        let err = PlanError::MaxRetriesExceeded {
            attempts: 3,
            last_diagnostic: "arrival off by 5 minutes".into(),
        };
        assert_eq!(
            err.to_string(),
            "no valid plan after 3 attempts: arrival off by 5 minutes"
        );

        let err = PlanError::DataCoverageGap {
            region: "深圳市".into(),
        };
        assert_eq!(err.to_string(), "no service-station data for region 深圳市");
    }

    #[test]
    fn no_route_names_stations() {
        let err = MapError::NoRoute {
            from: LonLat::new(113.0, 23.0).unwrap(),
            to: LonLat::new(114.0, 24.0).unwrap(),
        };
        let err = PlanError::from_path_error(err, "广州市黄埔区", "贵阳市");
        assert!(
            matches!(err, PlanError::RouteUnavailable { ref from, ref to } if from == "广州市黄埔区" && to == "贵阳市")
        );
    }

    #[test]
    fn other_map_errors_pass_through() {
        let err = PlanError::from_path_error(MapError::RateLimited, "A", "B");
        assert!(matches!(err, PlanError::Map(MapError::RateLimited)));

        let err = PlanError::from_geocode_error(
            MapError::NoGeocode {
                address: "nowhere".into(),
            },
            "nowhere",
        );
        assert!(matches!(err, PlanError::Geocode { .. }));
    }

    #[test]
    fn coverage_gap_from_matcher() {
        let err: PlanError = MatchError::CoverageGap {
            region: "深圳市".into(),
        }
        .into();
        assert!(matches!(err, PlanError::DataCoverageGap { region } if region == "深圳市"));
    }
}
