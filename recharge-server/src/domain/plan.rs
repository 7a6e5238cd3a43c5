//! Recharging plan types.
//!
//! Plans are produced by the external generator; the engine only reads
//! and verifies them. Field names follow the generator's JSON schema.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One recharging stop of a candidate plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// Trip origin or the previous recharging stop.
    pub from_stop: String,

    /// The stop where the car recharges.
    pub arrival_stop: String,

    /// Fallback stop in case the arrival stop is out of service.
    /// The generator sends `""` for "none".
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub backup_stop: Option<String>,

    /// "HH:MM" arrival at `arrival_stop`.
    pub arrival_time: String,

    /// "HH:MM" departure from `arrival_stop`.
    pub departure_time: String,

    /// State of charge on arrival, percent.
    pub soc_before_recharge: f64,

    /// State of charge on departure, percent.
    pub soc_after_recharge: f64,

    /// Minutes spent recharging.
    pub recharge_time: u32,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Structured reply of the plan generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    /// Why no plan could be made; empty on success.
    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub recharging_plan: Vec<PlanStep>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn none_as_empty<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Planning preferences a driver can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    /// Always keep a reachable backup stop.
    Conservative,
    /// Push each leg to the minimum allowed charge.
    Aggressive,
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetKind::Conservative => f.write_str("conservative"),
            PresetKind::Aggressive => f.write_str("aggressive"),
        }
    }
}

/// A preset with its natural-language instruction for the generator.
///
/// Program logic only looks at `kind`; `description` and `tag_hint` are
/// payload for the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub kind: PresetKind,
    pub description: String,
    /// Tag the generator may attach to stops this preset affects.
    pub tag_hint: Option<String>,
}

impl Preset {
    /// Build the preset text for a vehicle with the given hard SOC floor.
    pub fn new(kind: PresetKind, hard_min_soc_percent: f64) -> Self {
        match kind {
            PresetKind::Conservative => Self {
                kind,
                description: format!(
                    "make sure there is always a backup service stop to recharge in case driver \
                     arrives at the planned service stop and finds out it is out of service, make \
                     sure soc is above {hard_min_soc_percent}% when car arrives the backup service stop."
                ),
                tag_hint: None,
            },
            PresetKind::Aggressive => Self {
                kind,
                description: "make sure car arrives at planned service stop with soc above \
                              minimal allowed soc."
                    .to_string(),
                tag_hint: Some("check charger availability at this stop".to_string()),
            },
        }
    }

    /// One requirement bullet for the prompt.
    pub fn prompt_line(&self) -> String {
        format!(
            "**{}**:{}**tag**:{}",
            self.kind,
            self.description,
            self.tag_hint.as_deref().unwrap_or("None")
        )
    }
}
