//! Geographic matching of driving paths against the station catalog.

mod haversine;
mod matcher;
mod provider;

pub use haversine::{EARTH_RADIUS_M, haversine_m};
pub use matcher::{DEFAULT_MATCH_RADIUS_M, GeoMatcher, MatchError};
pub use provider::{Geocoder, PathProvider};
