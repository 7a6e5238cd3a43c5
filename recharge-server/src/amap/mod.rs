//! AMap (高德地图) web service client.
//!
//! This module provides an HTTP client for the two AMap endpoints the
//! planner needs: driving directions and address geocoding.
//!
//! Key characteristics of AMap responses:
//! - Every scalar is a string, including numbers and the `status` flag
//! - Empty values arrive as `[]` rather than `""` or `null`
//! - A request can succeed at the HTTP level and still fail with
//!   `status: "0"` and an error identifier in `info`

mod client;
mod convert;
mod error;
mod types;

pub use client::{AmapClient, AmapConfig};
pub use convert::{ConversionError, parse_polyline, select_path};
pub use error::MapError;
pub use types::{DrivingResponse, GeocodeResponse, Lenient, PathDto, RouteDto, StepDto};
