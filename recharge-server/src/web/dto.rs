//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{ClockTime, Leg, PlanStep, PresetKind, Route};
use crate::planner::{TripPlan, TripRequest, TripStart};

/// Request to segment a trip into legs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLegsRequest {
    /// Start address
    pub start: String,

    /// Destination address
    pub destination: String,
}

/// Costed legs of a trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLegsResponse {
    pub legs: Vec<Leg>,

    /// Sum of leg distances (km)
    pub total_distance_km: f64,

    /// Sum of leg consumption (kWh)
    pub total_consumption_kwh: f64,

    /// Sum of driving times (minutes)
    pub total_minutes: u32,
}

/// Request to check a recharging plan against a leg chain.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPlanRequest {
    pub plan: Vec<PlanStep>,

    /// The leg chain; must be contiguous.
    pub legs: Route,

    /// Trip start, "HH:MM"
    pub start_time: String,

    /// Charge at the start (percent), full if omitted
    #[serde(default = "full_charge")]
    pub start_soc: f64,
}

/// Verification verdict.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPlanResponse {
    pub accepted: bool,

    /// The first failed check, empty when accepted
    pub diagnostic: String,
}

/// Request to plan a trip end to end.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanRequest {
    pub start: String,
    pub destination: String,

    /// Departure, "HH:MM"
    pub start_time: String,

    /// Charge at departure (percent)
    pub start_soc: f64,

    /// Highest charge to recharge to (percent)
    #[serde(default = "full_charge")]
    pub max_soc: f64,

    /// Lowest charge to arrive at a stop with (percent)
    #[serde(default)]
    pub min_soc: f64,

    #[serde(default)]
    pub presets: Vec<PresetKind>,

    /// Free-form driver requirements
    #[serde(default)]
    pub free_text: String,

    /// Generator attempts before giving up
    pub max_retries: Option<usize>,
}

fn full_charge() -> f64 {
    100.0
}

/// A planned trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResponse {
    pub legs: Vec<Leg>,
    pub total_distance_km: f64,
    pub total_consumption_kwh: f64,
    pub recharging_plan: Vec<PlanStep>,

    /// Generator calls made
    pub attempts: usize,

    /// True when the start charge covers the trip
    pub no_recharge_needed: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl RouteLegsResponse {
    pub fn from_route(route: &Route) -> Self {
        Self {
            legs: route.legs().to_vec(),
            total_distance_km: route.total_distance_km(),
            total_consumption_kwh: route.total_consumption_kwh(),
            total_minutes: route.total_minutes(),
        }
    }
}

impl TripPlanResponse {
    pub fn from_plan(plan: TripPlan) -> Self {
        Self {
            total_distance_km: plan.route.total_distance_km(),
            total_consumption_kwh: plan.route.total_consumption_kwh(),
            legs: plan.route.into_legs(),
            recharging_plan: plan.recharging_plan,
            attempts: plan.attempts,
            no_recharge_needed: plan.no_recharge_needed,
        }
    }
}

/// A state-of-charge field outside 0–100 %.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be between 0 and 100, got {value}")]
pub struct InvalidSoc {
    pub field: &'static str,
    pub value: f64,
}

fn check_soc(field: &'static str, value: f64) -> Result<f64, InvalidSoc> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidSoc { field, value })
    }
}

/// Validation failure of a [`TripPlanRequest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidTripRequest {
    #[error("invalid start time {value:?}: {reason}")]
    StartTime { value: String, reason: String },

    #[error(transparent)]
    Soc(#[from] InvalidSoc),

    #[error("minSoc ({min}) must be below maxSoc ({max})")]
    SocOrder { min: f64, max: f64 },

    #[error("{0} must not be empty")]
    MissingAddress(&'static str),
}

/// Parse an "HH:MM" request field.
pub fn parse_start_time(value: &str) -> Result<ClockTime, InvalidTripRequest> {
    ClockTime::parse_hhmm(value).map_err(|e| InvalidTripRequest::StartTime {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl VerifyPlanRequest {
    /// The validated start time and charge.
    pub fn trip_start(&self) -> Result<TripStart, InvalidTripRequest> {
        Ok(TripStart {
            time: parse_start_time(&self.start_time)?,
            soc_percent: check_soc("startSoc", self.start_soc)?,
        })
    }
}

impl TryFrom<TripPlanRequest> for TripRequest {
    type Error = InvalidTripRequest;

    fn try_from(req: TripPlanRequest) -> Result<Self, Self::Error> {
        if req.start.trim().is_empty() {
            return Err(InvalidTripRequest::MissingAddress("start"));
        }
        if req.destination.trim().is_empty() {
            return Err(InvalidTripRequest::MissingAddress("destination"));
        }

        let start_time = parse_start_time(&req.start_time)?;
        let start_soc = check_soc("startSoc", req.start_soc)?;
        let max_soc = check_soc("maxSoc", req.max_soc)?;
        let min_soc = check_soc("minSoc", req.min_soc)?;
        if min_soc >= max_soc {
            return Err(InvalidTripRequest::SocOrder {
                min: min_soc,
                max: max_soc,
            });
        }

        Ok(TripRequest {
            start: req.start.trim().to_string(),
            destination: req.destination.trim().to_string(),
            start_time,
            start_soc,
            max_soc,
            min_soc,
            presets: req.presets,
            free_text: req.free_text,
            max_retries: req.max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_json(extra: &str) -> String {
        format!(
            r#"{{"start":"广州市黄埔区","destination":"贵阳市","startTime":"07:30","startSoc":90{extra}}}"#
        )
    }

    #[test]
    fn trip_request_defaults() {
        let req: TripPlanRequest = serde_json::from_str(&trip_json("")).unwrap();
        let trip = TripRequest::try_from(req).unwrap();

        assert_eq!(trip.start_time.to_string(), "07:30");
        assert_eq!(trip.max_soc, 100.0);
        assert_eq!(trip.min_soc, 0.0);
        assert!(trip.presets.is_empty());
        assert_eq!(trip.max_retries, None);
    }

    #[test]
    fn trip_request_full() {
        let req: TripPlanRequest = serde_json::from_str(&trip_json(
            r#","maxSoc":95,"minSoc":15,"presets":["conservative","aggressive"],"freeText":"lunch at noon","maxRetries":5"#,
        ))
        .unwrap();
        let trip = TripRequest::try_from(req).unwrap();

        assert_eq!(trip.max_soc, 95.0);
        assert_eq!(trip.min_soc, 15.0);
        assert_eq!(
            trip.presets,
            vec![PresetKind::Conservative, PresetKind::Aggressive]
        );
        assert_eq!(trip.free_text, "lunch at noon");
        assert_eq!(trip.max_retries, Some(5));
    }

    #[test]
    fn trip_request_validation() {
        let bad_time: TripPlanRequest =
            serde_json::from_str(&trip_json("").replace("07:30", "7.30")).unwrap();
        assert!(matches!(
            TripRequest::try_from(bad_time),
            Err(InvalidTripRequest::StartTime { .. })
        ));

        let bad_soc: TripPlanRequest = serde_json::from_str(&trip_json(r#","maxSoc":120"#)).unwrap();
        assert_eq!(
            TripRequest::try_from(bad_soc).unwrap_err(),
            InvalidTripRequest::Soc(InvalidSoc {
                field: "maxSoc",
                value: 120.0
            })
        );

        let inverted: TripPlanRequest =
            serde_json::from_str(&trip_json(r#","maxSoc":20,"minSoc":30"#)).unwrap();
        assert!(matches!(
            TripRequest::try_from(inverted),
            Err(InvalidTripRequest::SocOrder { .. })
        ));

        let blank: TripPlanRequest =
            serde_json::from_str(&trip_json("").replace("广州市黄埔区", " ")).unwrap();
        assert_eq!(
            TripRequest::try_from(blank).unwrap_err(),
            InvalidTripRequest::MissingAddress("start")
        );
    }

    #[test]
    fn unknown_preset_rejected() {
        assert!(serde_json::from_str::<TripPlanRequest>(&trip_json(r#","presets":["scenic"]"#)).is_err());
    }

    #[test]
    fn verify_request_validates_chain() {
        let ok = r#"{
            "plan": [],
            "legs": [
                {"start":"A","end":"B","distanceKm":10,"consumedTimeMin":8,"consumedBatteryKwh":1.72},
                {"start":"B","end":"C","distanceKm":10,"consumedTimeMin":8,"consumedBatteryKwh":1.72}
            ],
            "startTime": "08:00"
        }"#;
        let req: VerifyPlanRequest = serde_json::from_str(ok).unwrap();
        assert_eq!(req.legs.len(), 2);
        assert_eq!(req.start_soc, 100.0);

        let start = req.trip_start().unwrap();
        assert_eq!(start.time.to_string(), "08:00");
        assert_eq!(start.soc_percent, 100.0);

        let overcharged: VerifyPlanRequest =
            serde_json::from_str(&ok.replace(r#""startTime""#, r#""startSoc": 500, "startTime""#))
                .unwrap();
        assert_eq!(
            overcharged.trip_start().unwrap_err(),
            InvalidTripRequest::Soc(InvalidSoc {
                field: "startSoc",
                value: 500.0
            })
        );

        let broken = ok.replace(r#""start":"B""#, r#""start":"X""#);
        assert!(serde_json::from_str::<VerifyPlanRequest>(&broken).is_err());
    }

    #[test]
    fn trip_response_shape() {
        let route = Route::new(vec![
            Leg::new("A", "S", 40.0, 25, 6.88, vec![]).unwrap(),
            Leg::new("S", "B", 10.0, 8, 1.72, vec![]).unwrap(),
        ])
        .unwrap();
        let response = TripPlanResponse::from_plan(TripPlan {
            route,
            recharging_plan: vec![],
            attempts: 0,
            no_recharge_needed: true,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["legs"].as_array().unwrap().len(), 2);
        assert_eq!(json["totalDistanceKm"], 50.0);
        assert_eq!(json["noRechargeNeeded"], true);
        assert_eq!(json["rechargingPlan"], serde_json::json!([]));
    }
}
