//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::planner::{PlanError, PlanVerifier, TripPlanner, TripRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route/legs", post(route_legs))
        .route("/plan/verify", post(verify_plan))
        .route("/plan/trip", post(plan_trip))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, logging it on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Geocode and segment a trip.
async fn route_legs(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RouteLegsResponse>, AppError> {
    let req: RouteLegsRequest = parse_body(&body)?;

    let planner = TripPlanner::new(
        &state.catalog,
        state.maps.as_ref(),
        state.generator.as_ref(),
        &state.config,
    );
    let route = planner.route(&req.start, &req.destination).await?;

    Ok(Json(RouteLegsResponse::from_route(&route)))
}

/// Check a recharging plan against a leg chain.
async fn verify_plan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VerifyPlanResponse>, AppError> {
    let req: VerifyPlanRequest = parse_body(&body)?;
    let start = req.trip_start()?;

    let verifier = PlanVerifier::new(&state.config.vehicle, &state.config.tolerances);
    let response = match verifier.verify(&req.plan, &req.legs, start) {
        Ok(()) => VerifyPlanResponse {
            accepted: true,
            diagnostic: String::new(),
        },
        Err(violation) => VerifyPlanResponse {
            accepted: false,
            diagnostic: violation.to_string(),
        },
    };

    Ok(Json(response))
}

/// Plan a trip end to end.
async fn plan_trip(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TripPlanResponse>, AppError> {
    let req: TripPlanRequest = parse_body(&body)?;
    let request = TripRequest::try_from(req)?;

    info!(
        from = %request.start,
        to = %request.destination,
        start_soc = request.start_soc,
        "planning trip"
    );

    let planner = TripPlanner::new(
        &state.catalog,
        state.maps.as_ref(),
        state.generator.as_ref(),
        &state.config,
    );
    let plan = planner.plan_trip(&request).await?;

    Ok(Json(TripPlanResponse::from_plan(plan)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or out-of-range request.
    BadRequest { message: String },
    /// Well-formed request that cannot be served: no route, no data, no plan.
    Unprocessable { message: String },
    /// The map provider or plan generator failed.
    Upstream { message: String },
}

impl From<InvalidTripRequest> for AppError {
    fn from(e: InvalidTripRequest) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            PlanError::RouteUnavailable { .. }
            | PlanError::DataCoverageGap { .. }
            | PlanError::Geocode { .. }
            | PlanError::MaxRetriesExceeded { .. }
            | PlanError::NoPlanProduced { .. } => AppError::Unprocessable { message },
            PlanError::Domain(_) => AppError::BadRequest { message },
            PlanError::Map(_) | PlanError::Generator(_) => AppError::Upstream { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        warn!(status = status.as_u16(), %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amap::{AmapClient, AmapConfig, MapError};
    use crate::cache::{CacheConfig, CachedMapClient};
    use crate::catalog::StationCatalog;
    use crate::domain::LonLat;
    use crate::generator::{ChatClient, ChatConfig, GeneratorError};
    use crate::planner::PlannerConfig;

    fn state() -> AppState {
        let maps = AmapClient::new(AmapConfig::new("test-key")).unwrap();
        AppState::new(
            StationCatalog::default(),
            CachedMapClient::new(maps, &CacheConfig::default()),
            ChatClient::new(ChatConfig::new("test-key")).unwrap(),
            PlannerConfig::default(),
        )
    }

    fn status_of(e: impl Into<AppError>) -> StatusCode {
        let err: AppError = e.into();
        err.into_response().status()
    }

    const LEGS: &str = r#"[
        {"start":"广州市黄埔区","end":"甲服务区","distanceKm":80,"consumedTimeMin":60,"consumedBatteryKwh":20},
        {"start":"甲服务区","end":"贵阳市","distanceKm":60,"consumedTimeMin":40,"consumedBatteryKwh":15}
    ]"#;

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn verify_accepts_plan() {
        // 59.5 kWh start, 39.5 left at 甲 (66% = 39.27); 100% takes 19 min.
        let body = format!(
            r#"{{"plan":[{{"fromStop":"广州市黄埔区","arrivalStop":"甲服务区","backupStop":"",
                "arrivalTime":"09:00","departureTime":"09:19","socBeforeRecharge":66,
                "socAfterRecharge":100,"rechargeTime":19,"tags":[]}}],
              "legs":{LEGS},"startTime":"08:00"}}"#
        );
        let Json(response) = verify_plan(State(state()), Bytes::from(body)).await.unwrap();
        assert!(response.accepted, "{}", response.diagnostic);
        assert!(response.diagnostic.is_empty());
    }

    #[tokio::test]
    async fn verify_reports_diagnostic() {
        let body = format!(r#"{{"plan":[],"legs":{LEGS},"startTime":"08:00","startSoc":50}}"#);
        let Json(response) = verify_plan(State(state()), Bytes::from(body)).await.unwrap();
        assert!(!response.accepted);
        assert!(
            response
                .diagnostic
                .contains("from 广州市黄埔区 to 贵阳市 will be under 5%"),
            "{}",
            response.diagnostic
        );
    }

    #[tokio::test]
    async fn verify_rejects_bad_input() {
        let bad_time = format!(r#"{{"plan":[],"legs":{LEGS},"startTime":"8am"}}"#);
        let err = verify_plan(State(state()), Bytes::from(bad_time))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let overcharged =
            format!(r#"{{"plan":[],"legs":{LEGS},"startTime":"08:00","startSoc":500}}"#);
        let err = verify_plan(State(state()), Bytes::from(overcharged))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message.contains("startSoc")));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let err = verify_plan(State(state()), Bytes::from_static(b"{not json"))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn plan_trip_validates_before_planning() {
        let body = r#"{"start":"A","destination":"B","startTime":"07:30","startSoc":150}"#;
        let err = plan_trip(State(state()), Bytes::from_static(body.as_bytes()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { message } if message.contains("startSoc")));
    }

    #[test]
    fn plan_errors_map_to_status() {
        assert_eq!(
            status_of(PlanError::RouteUnavailable {
                from: "A".into(),
                to: "B".into(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PlanError::DataCoverageGap {
                region: "深圳市".into(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PlanError::MaxRetriesExceeded {
                attempts: 3,
                last_diagnostic: "late".into(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PlanError::Map(MapError::NoRoute {
                from: LonLat::new(113.0, 23.0).unwrap(),
                to: LonLat::new(114.0, 23.0).unwrap(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(PlanError::Generator(GeneratorError::RateLimited)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn exhausted_retries_carry_diagnostic() {
        let err = AppError::from(PlanError::MaxRetriesExceeded {
            attempts: 3,
            last_diagnostic: "there is 5 minutes deviation".into(),
        });
        assert!(
            matches!(err, AppError::Unprocessable { message } if message.ends_with("there is 5 minutes deviation"))
        );
    }
}
