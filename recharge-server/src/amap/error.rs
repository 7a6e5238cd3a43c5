//! AMap client error types.

use crate::domain::LonLat;

use super::convert::ConversionError;

/// Errors from the AMap HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// HTTP status other than success
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Request accepted at the HTTP level but refused by the service,
    /// e.g. an invalid key or an exhausted quota.
    #[error("map service rejected request: {info} ({infocode})")]
    Rejected { info: String, infocode: String },

    /// Rate limited by the API
    #[error("rate limited by map API")]
    RateLimited,

    /// No driving path between the two points
    #[error("no driving route from {from} to {to}")]
    NoRoute { from: LonLat, to: LonLat },

    /// Address could not be geocoded
    #[error("no location found for address {address:?}")]
    NoGeocode { address: String },

    /// Response decoded but was not usable
    #[error("invalid map response: {0}")]
    Conversion(#[from] ConversionError),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}
