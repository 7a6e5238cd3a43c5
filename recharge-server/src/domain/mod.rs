//! Domain types for the recharge planner.
//!
//! This module contains the core domain model types. Types with invariants
//! enforce them at construction time, so code that receives these types can
//! trust their validity.

mod error;
mod leg;
mod path;
mod plan;
mod route;
mod station;
mod time;

pub use error::DomainError;
pub use leg::{Leg, LegSummary};
pub use path::{DrivingPath, PathStep, RegionRef};
pub use plan::{GeneratedPlan, PlanStep, Preset, PresetKind};
pub use route::Route;
pub use station::{InvalidCoordinates, LonLat, Station, StationGroup, group_key, names_match};
pub use time::{ClockTime, MINUTES_PER_DAY, TimeError};
