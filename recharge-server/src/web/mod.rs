//! Web layer for the recharge planner.
//!
//! Provides HTTP endpoints for segmenting routes, verifying plans and
//! planning trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
