//! AMap REST API response DTOs.
//!
//! These types map directly to the AMap JSON responses. AMap sends every
//! scalar as a string and sends `[]` instead of `""` for empty values, so
//! scalars decode through [`Lenient`] and nested collections tolerate any
//! non-array placeholder.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// A scalar that may arrive as a string, a number, or an empty placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lenient(Option<String>);

impl Lenient {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// The value, if the field carried one.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl<'de> Deserialize<'de> for Lenient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Lenient(match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }))
    }
}

/// Decode an array, treating any other JSON value as empty.
fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

/// Decode an object, treating any other JSON value as absent.
fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Status fields common to every AMap response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// "1" on success, "0" on failure.
    #[serde(default)]
    pub status: Lenient,

    /// "OK" or an error identifier like "INVALID_USER_KEY".
    #[serde(default)]
    pub info: Lenient,

    #[serde(default)]
    pub infocode: Lenient,

    /// Number of results.
    #[serde(default)]
    pub count: Lenient,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status.as_str() == Some("1")
    }

    /// Result count; unparseable or missing counts as zero.
    pub fn result_count(&self) -> u64 {
        self.count
            .as_str()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Response from `/v5/direction/driving`.
#[derive(Debug, Clone, Deserialize)]
pub struct DrivingResponse {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(default, deserialize_with = "object_or_none")]
    pub route: Option<RouteDto>,
}

/// Candidate paths between origin and destination.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub origin: Lenient,

    #[serde(default)]
    pub destination: Lenient,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub paths: Vec<PathDto>,
}

/// One candidate driving path.
#[derive(Debug, Clone, Deserialize)]
pub struct PathDto {
    /// Total length in metres.
    #[serde(default)]
    pub distance: Lenient,

    #[serde(default, deserialize_with = "object_or_none")]
    pub cost: Option<CostDto>,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub steps: Vec<StepDto>,
}

/// Cost block of a path or step (requested via `show_fields=cost`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostDto {
    /// Driving time in seconds.
    #[serde(default)]
    pub duration: Lenient,

    /// Toll fee in yuan.
    #[serde(default)]
    pub tolls: Lenient,

    /// Length of the toll section in metres.
    #[serde(default)]
    pub toll_distance: Lenient,

    /// Name of the toll road; present only on toll sections.
    #[serde(default)]
    pub toll_road: Lenient,
}

/// One navigation step.
#[derive(Debug, Clone, Deserialize)]
pub struct StepDto {
    #[serde(default)]
    pub instruction: Lenient,

    #[serde(default)]
    pub road_name: Lenient,

    /// Step length in metres.
    #[serde(default)]
    pub step_distance: Lenient,

    #[serde(default, deserialize_with = "object_or_none")]
    pub cost: Option<CostDto>,

    /// Cities traversed (requested via `show_fields=cities`).
    #[serde(default, deserialize_with = "list_or_empty")]
    pub cities: Vec<CityDto>,

    /// `"lon,lat;lon,lat;..."` (requested via `show_fields=polyline`).
    #[serde(default)]
    pub polyline: Lenient,
}

/// A city crossed by a step.
#[derive(Debug, Clone, Deserialize)]
pub struct CityDto {
    #[serde(default)]
    pub city: Lenient,

    #[serde(default)]
    pub adcode: Lenient,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub districts: Vec<DistrictDto>,
}

/// A district crossed by a step.
#[derive(Debug, Clone, Deserialize)]
pub struct DistrictDto {
    #[serde(default)]
    pub name: Lenient,

    #[serde(default)]
    pub adcode: Lenient,
}

/// Response from `/v3/geocode/geo`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub geocodes: Vec<GeocodeDto>,
}

/// One geocoding candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeDto {
    #[serde(default)]
    pub formatted_address: Lenient,

    /// `"lon,lat"`.
    #[serde(default)]
    pub location: Lenient,

    /// Match granularity, e.g. "门牌号" or "兴趣点".
    #[serde(default)]
    pub level: Lenient,
}
