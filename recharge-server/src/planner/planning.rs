//! The trip planning loop.
//!
//! Segments the trip, asks the generator for a recharging plan and checks
//! it with the [`PlanVerifier`]. Rejected plans are sent back with the
//! verifier's diagnostic until one is accepted or the attempt budget runs
//! out.

use tracing::{debug, info, warn};

use crate::catalog::StationCatalog;
use crate::domain::{ClockTime, PlanStep, Preset, PresetKind, Route, Station};
use crate::generator::{
    ChatMessage, PlanGenerator, PlanPrompt, initial_conversation, parse_plan, retry_feedback,
};
use crate::geo::{Geocoder, PathProvider};

use super::config::PlannerConfig;
use super::error::PlanError;
use super::segment::RouteSegmenter;
use super::verify::{PlanVerifier, TripStart};

/// Everything needed to plan one trip.
#[derive(Debug, Clone)]
pub struct TripRequest {
    /// Start address.
    pub start: String,
    /// Destination address.
    pub destination: String,
    pub start_time: ClockTime,
    /// Charge at departure, percent.
    pub start_soc: f64,
    /// Highest charge to recharge to, percent.
    pub max_soc: f64,
    /// Lowest charge the driver wants to arrive at a stop with, percent.
    pub min_soc: f64,
    pub presets: Vec<PresetKind>,
    pub free_text: String,
    /// Overrides [`PlannerConfig::max_retries`].
    pub max_retries: Option<usize>,
}

/// A planned trip.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub route: Route,
    /// Accepted recharging stops; empty when no recharge is needed.
    pub recharging_plan: Vec<PlanStep>,
    /// Generator calls made.
    pub attempts: usize,
    pub no_recharge_needed: bool,
}

/// States of the generate/verify loop.
enum LoopState {
    Generating,
    Verifying { answer: String },
    Accepted(Vec<PlanStep>),
    Exhausted,
}

/// Plans trips against a station catalog, a map provider and a plan
/// generator.
pub struct TripPlanner<'a, M, G> {
    catalog: &'a StationCatalog,
    maps: &'a M,
    generator: &'a G,
    config: &'a PlannerConfig,
}

impl<'a, M, G> TripPlanner<'a, M, G>
where
    M: PathProvider + Geocoder,
    G: PlanGenerator,
{
    pub fn new(
        catalog: &'a StationCatalog,
        maps: &'a M,
        generator: &'a G,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            catalog,
            maps,
            generator,
            config,
        }
    }

    /// Geocode both ends of a trip and segment the drive between them.
    pub async fn route(&self, start: &str, destination: &str) -> Result<Route, PlanError> {
        let from = self.locate(start).await?;
        let to = self.locate(destination).await?;

        RouteSegmenter::new(
            self.catalog,
            self.maps,
            &self.config.segmenter,
            &self.config.vehicle,
        )
        .segment(&from, &to)
        .await
    }

    /// Plan `request` end to end.
    pub async fn plan_trip(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        let route = self.route(&request.start, &request.destination).await?;

        if self.covers_trip(&route, request) {
            info!(
                from = route.origin(),
                to = route.destination(),
                kwh = route.total_consumption_kwh(),
                "start charge covers the trip"
            );
            return Ok(TripPlan {
                route,
                recharging_plan: Vec::new(),
                attempts: 0,
                no_recharge_needed: true,
            });
        }

        let (recharging_plan, attempts) = self.generate_verified(&route, request).await?;
        Ok(TripPlan {
            route,
            recharging_plan,
            attempts,
            no_recharge_needed: false,
        })
    }

    async fn locate(&self, address: &str) -> Result<Station, PlanError> {
        let location = self
            .maps
            .geocode(address)
            .await
            .map_err(|e| PlanError::from_geocode_error(e, address))?;
        debug!(address, %location, "geocoded");
        Ok(Station::new(address, location))
    }

    /// True if the start charge reaches the destination above the stricter
    /// of the driver's and the vehicle's minimum.
    fn covers_trip(&self, route: &Route, request: &TripRequest) -> bool {
        let vehicle = &self.config.vehicle;
        let min_percent = request.min_soc.max(vehicle.hard_min_soc_percent);
        vehicle.soc_to_kwh(request.start_soc) - route.total_consumption_kwh()
            >= vehicle.soc_to_kwh(min_percent)
    }

    /// Run the generate/verify loop. Returns the accepted plan and the
    /// number of generator calls.
    async fn generate_verified(
        &self,
        route: &Route,
        request: &TripRequest,
    ) -> Result<(Vec<PlanStep>, usize), PlanError> {
        let vehicle = &self.config.vehicle;
        let max_attempts = request.max_retries.unwrap_or(self.config.max_retries).max(1);
        let verifier = PlanVerifier::new(vehicle, &self.config.tolerances);
        let start = TripStart {
            time: request.start_time,
            soc_percent: request.start_soc,
        };

        let presets: Vec<Preset> = request
            .presets
            .iter()
            .map(|&kind| Preset::new(kind, vehicle.hard_min_soc_percent))
            .collect();
        let legs = route.summaries();
        let prompt = PlanPrompt {
            start_time: request.start_time,
            start_soc: request.start_soc,
            max_soc: request.max_soc,
            min_soc: request.min_soc,
            presets: &presets,
            free_text: &request.free_text,
            legs: &legs,
        };
        let mut conversation = initial_conversation(&prompt, vehicle);

        let mut attempts = 0;
        let mut last_diagnostic = String::new();
        let mut state = LoopState::Generating;

        loop {
            state = match state {
                LoopState::Generating if attempts >= max_attempts => LoopState::Exhausted,
                LoopState::Generating => {
                    attempts += 1;
                    info!(attempt = attempts, max_attempts, "requesting recharging plan");
                    let answer = self.generator.generate(&conversation).await?;
                    LoopState::Verifying { answer }
                }
                LoopState::Verifying { answer } => {
                    match check_answer(&answer, &verifier, route, start)? {
                        Ok(steps) => LoopState::Accepted(steps),
                        Err(diagnostic) => {
                            warn!(attempt = attempts, %diagnostic, "plan rejected");
                            conversation.push(ChatMessage::assistant(answer));
                            conversation.push(ChatMessage::user(retry_feedback(&diagnostic)));
                            last_diagnostic = diagnostic;
                            LoopState::Generating
                        }
                    }
                }
                LoopState::Accepted(steps) => {
                    info!(attempts, stops = steps.len(), "plan accepted");
                    return Ok((steps, attempts));
                }
                LoopState::Exhausted => {
                    return Err(PlanError::MaxRetriesExceeded {
                        attempts,
                        last_diagnostic,
                    });
                }
            };
        }
    }
}

/// Parse and verify one generator answer.
///
/// The outer error is fatal; the inner one is a diagnostic to retry with.
fn check_answer(
    answer: &str,
    verifier: &PlanVerifier<'_>,
    route: &Route,
    start: TripStart,
) -> Result<Result<Vec<PlanStep>, String>, PlanError> {
    let plan = match parse_plan(answer) {
        Ok(plan) => plan,
        Err(e) => {
            return Ok(Err(format!(
                "The answer is not a valid JSON plan ({e}), the output must strictly follow the JSON schema"
            )));
        }
    };

    if !plan.reason.trim().is_empty() {
        return Err(PlanError::NoPlanProduced {
            reason: plan.reason,
        });
    }
    if plan.recharging_plan.is_empty() {
        return Err(PlanError::NoPlanProduced {
            reason: "the recharging plan is empty".to_string(),
        });
    }

    Ok(verifier
        .verify(&plan.recharging_plan, route, start)
        .map(|()| plan.recharging_plan)
        .map_err(|v| v.to_string()))
}
