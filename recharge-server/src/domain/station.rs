//! Service station and coordinate types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid `"lon,lat"` coordinate string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinates: {reason}")]
pub struct InvalidCoordinates {
    reason: &'static str,
}

/// A WGS-84 style coordinate pair as used by the map provider.
///
/// The wire format is the provider's `"lon,lat"` string, which is also
/// how catalog entries store their location.
///
/// # Examples
///
/// ```
/// use recharge_server::domain::LonLat;
///
/// let p: LonLat = "113.401198,22.759078".parse().unwrap();
/// assert_eq!(p.lon, 113.401198);
/// assert_eq!(p.lat, 22.759078);
/// assert_eq!(p.to_string(), "113.401198,22.759078");
///
/// assert!("113.4".parse::<LonLat>().is_err());
/// assert!("200,10".parse::<LonLat>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    /// Create a coordinate, validating the ranges.
    pub fn new(lon: f64, lat: f64) -> Result<Self, InvalidCoordinates> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinates {
                reason: "longitude must be within -180..=180",
            });
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinates {
                reason: "latitude must be within -90..=90",
            });
        }
        Ok(Self { lon, lat })
    }
}

impl FromStr for LonLat {
    type Err = InvalidCoordinates;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s.trim().split_once(',').ok_or(InvalidCoordinates {
            reason: "expected \"lon,lat\"",
        })?;
        let lon = lon.trim().parse::<f64>().map_err(|_| InvalidCoordinates {
            reason: "longitude is not a number",
        })?;
        let lat = lat.trim().parse::<f64>().map_err(|_| InvalidCoordinates {
            reason: "latitude is not a number",
        })?;
        Self::new(lon, lat)
    }
}

impl TryFrom<String> for LonLat {
    type Error = InvalidCoordinates;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LonLat> for String {
    fn from(value: LonLat) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lon, self.lat)
    }
}

/// A recharging location: a catalog service station, or a trip endpoint
/// resolved from an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Display name, unique within its district.
    pub name: String,

    /// Position of the station.
    pub location: LonLat,

    /// Altitude in metres, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl Station {
    pub fn new(name: impl Into<String>, location: LonLat) -> Self {
        Self {
            name: name.into(),
            location,
            altitude: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// The name with any direction suffix removed.
    pub fn group_key(&self) -> &str {
        group_key(&self.name)
    }
}

/// Strip a parenthesised direction suffix from a station name.
///
/// Highway service areas are catalogued once per carriageway, e.g.
/// `"X服务区(东向)"` and `"X服务区(西向)"`; both share the key `"X服务区"`.
/// Full-width brackets are handled too.
pub fn group_key(name: &str) -> &str {
    match name.find(['(', '（']) {
        Some(idx) => name[..idx].trim_end(),
        None => name,
    }
}

/// True if `name` refers to `station_name` either exactly or by its
/// direction-less group key.
pub fn names_match(name: &str, station_name: &str) -> bool {
    name == station_name || name == group_key(station_name)
}

/// The directional variants of one physical service area.
///
/// Invariant: every member's name starts with `key`, and the group is never
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub struct StationGroup {
    key: String,
    members: Vec<Station>,
}

impl StationGroup {
    /// Build a group around `anchor` from a pool of candidate stations.
    ///
    /// The anchor is always the first member, even if the pool doesn't
    /// contain it. Pool members whose name starts with the anchor's key
    /// follow in pool order.
    pub fn collect<'a>(anchor: &Station, pool: impl IntoIterator<Item = &'a Station>) -> Self {
        let key = anchor.group_key().to_string();
        let mut members = vec![anchor.clone()];
        for station in pool {
            if station.name != anchor.name && station.name.starts_with(&key) {
                members.push(station.clone());
            }
        }
        Self { key, members }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The anchor station the group was built from.
    pub fn anchor(&self) -> &Station {
        &self.members[0]
    }

    pub fn members(&self) -> &[Station] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
