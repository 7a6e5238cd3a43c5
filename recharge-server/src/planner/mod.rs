//! Trip planning.
//!
//! This module turns a driving route into a chain of costed legs and finds
//! a recharging plan for it:
//!
//! 1. [`RouteSegmenter`] samples the highway part of the route and snaps
//!    the samples to catalogued service areas, costing each station-to-
//!    station leg with the energy model.
//! 2. [`TripPlanner`] hands the legs to a plan generator and checks every
//!    answer with [`PlanVerifier`], feeding rejections back until a plan
//!    is accepted or the attempt budget is spent.

mod config;
mod energy;
mod error;
mod planning;
mod segment;
mod verify;

#[cfg(test)]
mod segment_tests;

pub use config::{PlannerConfig, SegmenterConfig, Tolerances, VehicleConfig};
pub use energy::{
    CLIMB_TAG, DESCENT_TAG, EnergyModel, base_consumption_kwh, cost_for_path, driving_minutes,
    gravity_kwh, round_to,
};
pub use error::PlanError;
pub use planning::{TripPlan, TripPlanner, TripRequest};
pub use segment::{RouteSegmenter, sample_points};
pub use verify::{PlanVerifier, TripStart, Violation};
