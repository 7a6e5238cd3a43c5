//! Station-to-station leg type.
//!
//! A `Leg` is one hop between consecutive recharging opportunities along a
//! trip, with its driving distance and the time and energy it costs.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A single station-to-station segment of a trip.
///
/// Units are fixed by the wire contract: kilometres, whole minutes and kWh.
///
/// # Invariants
///
/// - `start != end`
/// - distance and consumption are finite, distance is positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LegRecord", into = "LegRecord")]
pub struct Leg {
    start: String,
    end: String,
    distance_km: f64,
    consumed_time_min: u32,
    consumed_battery_kwh: f64,
    tags: Vec<String>,
}

impl Leg {
    /// Construct a leg, validating its invariants.
    ///
    /// # Examples
    ///
    /// ```
    /// use recharge_server::domain::Leg;
    ///
    /// let leg = Leg::new("A", "B", 42.3, 25, 7.28, vec![]).unwrap();
    /// assert_eq!(leg.start(), "A");
    /// assert_eq!(leg.consumed_time_min(), 25);
    ///
    /// assert!(Leg::new("A", "A", 1.0, 1, 0.1, vec![]).is_err());
    /// assert!(Leg::new("A", "B", -1.0, 1, 0.1, vec![]).is_err());
    /// assert!(Leg::new("A", "B", 0.0, 1, 0.1, vec![]).is_err());
    /// ```
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        distance_km: f64,
        consumed_time_min: u32,
        consumed_battery_kwh: f64,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let start = start.into();
        let end = end.into();

        if start == end {
            return Err(DomainError::InvalidLeg("start and end must differ"));
        }
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(DomainError::InvalidLeg("distance must be a positive number"));
        }
        if !consumed_battery_kwh.is_finite() {
            return Err(DomainError::InvalidLeg("consumed battery must be a number"));
        }

        Ok(Self {
            start,
            end,
            distance_km,
            consumed_time_min,
            consumed_battery_kwh,
            tags,
        })
    }

    /// Name of the station the leg starts from.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Name of the station the leg arrives at.
    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn consumed_time_min(&self) -> u32 {
        self.consumed_time_min
    }

    pub fn consumed_battery_kwh(&self) -> f64 {
        self.consumed_battery_kwh
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The reduced shape handed to the plan generator.
    pub fn summary(&self) -> LegSummary {
        LegSummary {
            start: self.start.clone(),
            end: self.end.clone(),
            consumed_time: self.consumed_time_min,
            consumed_battery: self.consumed_battery_kwh,
        }
    }
}

/// Wire form of a [`Leg`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegRecord {
    start: String,
    end: String,
    distance_km: f64,
    consumed_time_min: u32,
    consumed_battery_kwh: f64,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<LegRecord> for Leg {
    type Error = DomainError;

    fn try_from(r: LegRecord) -> Result<Self, Self::Error> {
        Leg::new(
            r.start,
            r.end,
            r.distance_km,
            r.consumed_time_min,
            r.consumed_battery_kwh,
            r.tags,
        )
    }
}

impl From<Leg> for LegRecord {
    fn from(leg: Leg) -> Self {
        Self {
            start: leg.start,
            end: leg.end,
            distance_km: leg.distance_km,
            consumed_time_min: leg.consumed_time_min,
            consumed_battery_kwh: leg.consumed_battery_kwh,
            tags: leg.tags,
        }
    }
}

/// A leg as described to the plan generator: only what it needs to plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegSummary {
    pub start: String,
    pub end: String,
    /// Driving time in minutes.
    pub consumed_time: u32,
    /// Energy used in kWh.
    pub consumed_battery: f64,
}
