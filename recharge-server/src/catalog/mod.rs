//! Static service-station catalog.
//!
//! Provides region → district → station lookup for the geo matcher.
//! The catalog is loaded once at startup, from the bundled JSON document
//! or from a file named in configuration, and never changes afterwards.

mod error;
mod index;
mod loader;

pub use error::CatalogError;
pub use index::{DistrictIndex, RegionIndex, StationCatalog};
