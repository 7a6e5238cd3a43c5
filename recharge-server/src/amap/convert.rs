//! Conversion from AMap DTOs to domain types.

use crate::domain::{DrivingPath, InvalidCoordinates, LonLat, PathStep, RegionRef};

use super::types::{CostDto, GeocodeResponse, Lenient, PathDto, RouteDto, StepDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A numeric field did not hold a number
    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A coordinate pair could not be parsed
    #[error("invalid point {point:?}: {reason}")]
    InvalidPoint {
        point: String,
        reason: InvalidCoordinates,
    },
}

/// Pick the fastest of the candidate paths.
///
/// Ties keep the earlier candidate. Returns `None` when the route holds
/// no paths.
pub fn select_path(route: &RouteDto) -> Result<Option<DrivingPath>, ConversionError> {
    let mut best: Option<DrivingPath> = None;
    for dto in &route.paths {
        let path = convert_path(dto)?;
        if best.as_ref().is_none_or(|b| path.duration_s < b.duration_s) {
            best = Some(path);
        }
    }
    Ok(best)
}

/// Convert one candidate path.
pub fn convert_path(dto: &PathDto) -> Result<DrivingPath, ConversionError> {
    let distance_m = required_number("path.distance", &dto.distance)?;
    let duration = dto
        .cost
        .as_ref()
        .map(|c| &c.duration)
        .ok_or(ConversionError::MissingField("path.cost"))?;
    let duration_s = required_number("path.cost.duration", duration)?;

    let steps = dto
        .steps
        .iter()
        .map(convert_step)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DrivingPath {
        distance_m,
        duration_s,
        steps,
    })
}

fn convert_step(dto: &StepDto) -> Result<PathStep, ConversionError> {
    let distance_m = required_number("step.step_distance", &dto.step_distance)?;
    let cost = dto.cost.clone().unwrap_or_default();
    let duration_s = optional_number("step.cost.duration", &cost.duration)?.unwrap_or(0.0);

    let polyline = match dto.polyline.as_str() {
        Some(s) => parse_polyline(s)?,
        None => Vec::new(),
    };

    let regions = dto
        .cities
        .iter()
        .filter_map(|city| {
            let name = city.city.as_str()?;
            let districts = city
                .districts
                .iter()
                .filter_map(|d| d.name.as_str().map(str::to_string))
                .collect();
            Some(RegionRef::new(name, districts))
        })
        .collect();

    Ok(PathStep {
        distance_m,
        toll: is_toll(&cost),
        duration_s,
        polyline,
        regions,
    })
}

/// A step is on a toll road when AMap names the toll road.
fn is_toll(cost: &CostDto) -> bool {
    cost.toll_road.is_present()
}

/// Parse an AMap polyline (`"lon,lat;lon,lat"`).
///
/// Empty segments, as left by a trailing `;`, are skipped.
pub fn parse_polyline(s: &str) -> Result<Vec<LonLat>, ConversionError> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<LonLat>()
                .map_err(|reason| ConversionError::InvalidPoint {
                    point: p.to_string(),
                    reason,
                })
        })
        .collect()
}

/// First geocoded location, or `None` if there are no candidates.
pub fn geocode_location(resp: &GeocodeResponse) -> Result<Option<LonLat>, ConversionError> {
    let Some(location) = resp.geocodes.iter().find_map(|g| g.location.as_str()) else {
        return Ok(None);
    };
    location
        .parse::<LonLat>()
        .map(Some)
        .map_err(|reason| ConversionError::InvalidPoint {
            point: location.to_string(),
            reason,
        })
}

fn required_number(field: &'static str, value: &Lenient) -> Result<f64, ConversionError> {
    optional_number(field, value)?.ok_or(ConversionError::MissingField(field))
}

fn optional_number(field: &'static str, value: &Lenient) -> Result<Option<f64>, ConversionError> {
    let Some(raw) = value.as_str() else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(ConversionError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
