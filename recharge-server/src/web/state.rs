//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedMapClient;
use crate::catalog::StationCatalog;
use crate::generator::ChatClient;
use crate::planner::PlannerConfig;

/// Shared application state.
///
/// Everything here is read-only after start-up; requests share it freely.
#[derive(Clone)]
pub struct AppState {
    /// Service-station catalog
    pub catalog: Arc<StationCatalog>,

    /// Cached AMap client
    pub maps: Arc<CachedMapClient>,

    /// Recharging plan generator
    pub generator: Arc<ChatClient>,

    /// Vehicle model, sampling and verification settings
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        catalog: StationCatalog,
        maps: CachedMapClient,
        generator: ChatClient,
        config: PlannerConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            maps: Arc::new(maps),
            generator: Arc::new(generator),
            config: Arc::new(config),
        }
    }
}
