//! Server configuration from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::amap::AmapConfig;
use crate::generator::ChatConfig;
use crate::planner::PlannerConfig;

const DEFAULT_PORT: u16 = 3000;

/// An environment variable with an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {name}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Everything the server reads at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub amap: AmapConfig,
    pub chat: ChatConfig,
    /// Station catalog file; the bundled catalog when unset.
    pub catalog_path: Option<PathBuf>,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let key = |name: &'static str| {
            var(name).unwrap_or_else(|| {
                warn!("{name} not set; requests to that service will fail");
                String::new()
            })
        };

        let mut amap = AmapConfig::new(key("AMAP_API_KEY"));
        if let Some(url) = var("AMAP_BASE_URL") {
            amap = amap.with_base_url(url);
        }

        let mut chat = ChatConfig::new(key("LLM_API_KEY"));
        if let Some(url) = var("LLM_BASE_URL") {
            chat = chat.with_base_url(url);
        }
        if let Some(model) = var("LLM_MODEL") {
            chat = chat.with_model(model);
        }

        let mut planner = PlannerConfig::default();
        if let Some(n) = parse_var::<usize>(&var, "PLAN_MAX_RETRIES")? {
            if n == 0 {
                return Err(invalid("PLAN_MAX_RETRIES", n, "must be at least 1"));
            }
            planner.max_retries = n;
        }
        if let Some(percent) = parse_var::<f64>(&var, "HARD_MIN_SOC")? {
            if !(0.0..100.0).contains(&percent) {
                return Err(invalid("HARD_MIN_SOC", percent, "must be a percentage below 100"));
            }
            planner.vehicle.hard_min_soc_percent = percent;
        }
        if let Some(efficiency) = parse_var::<f64>(&var, "REGEN_EFFICIENCY")? {
            if !(0.0..=1.0).contains(&efficiency) {
                return Err(invalid("REGEN_EFFICIENCY", efficiency, "must be between 0 and 1"));
            }
            planner.vehicle.regen_efficiency = efficiency;
        }

        Ok(Self {
            port: parse_var(&var, "PORT")?.unwrap_or(DEFAULT_PORT),
            amap,
            chat,
            catalog_path: var("STATION_CATALOG").map(PathBuf::from),
            planner,
        })
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    var(name)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError {
                name,
                value,
                reason: "not a number",
            })
        })
        .transpose()
}

fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError {
        name,
        value: value.to_string(),
        reason,
    }
}
