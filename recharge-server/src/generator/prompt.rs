//! Prompt construction for plan generation.

use serde_json::{Value, json};

use crate::domain::{ClockTime, LegSummary, Preset};
use crate::planner::VehicleConfig;

use super::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for to help user make all kinds of \
     accurate and efficient plans, when you are crunching numbers, double check the correctness \
     of your calculation.";

/// Trip facts and driver preferences the prompt is built from.
#[derive(Debug, Clone)]
pub struct PlanPrompt<'a> {
    pub start_time: ClockTime,
    pub start_soc: f64,
    pub max_soc: f64,
    pub min_soc: f64,
    pub presets: &'a [Preset],
    pub free_text: &'a str,
    pub legs: &'a [LegSummary],
}

impl PlanPrompt<'_> {
    /// The user message: trip facts, route data, requirements and the
    /// output schema.
    pub fn user_message(&self, vehicle: &VehicleConfig) -> String {
        let hard_min = vehicle.hard_min_soc_percent;
        let legs = serde_json::to_string(self.legs).unwrap_or_else(|_| "[]".to_string());
        let presets = self
            .presets
            .iter()
            .map(Preset::prompt_line)
            .collect::<Vec<_>>()
            .join("\n- ");
        let free_text = if self.free_text.trim().is_empty() {
            "None"
        } else {
            self.free_text.trim()
        };

        format!(
            "please assist the EV driver to make a recharging plan based on below info:
**basic info**:
- Journey start time: {start_time}
- EV full battery: {max_battery}Kwh
- Start Soc: {start_soc}%
- Max recharge to Soc: {max_soc}%
- Minimal allowed Soc: {min_soc}%, minimal allowed soc before arriving at a recharging stop, set by user, should never be under {hard_min}%, if asked minimal allowed soc is under {hard_min}%, use hard setting: {hard_min}%
- Charging rate: {rate}Kwh per hour
- Charging overhead: {efficiency}, meaning per 1kwh from the charger only {efficiency}kwh can be converted into car's battery
- Reduce the recharging times as less as possible to save overall trip time

**route data structure info**:
- the route provided to you consists of a list of steps, each step follows below JSON structure: {{start: <name of the start service stop>, end: <name of the end service stop>, consumedTime: <driving time from start to end in mins>, consumedBattery: <consumed battery from start to end in Kwh>}}
- car can be recharged at any of these service stops
**route data**:
{legs}

**driver's selected requirements(the options provided by App, selected requirement includes both requirement and related tags, tags can be put on the matching service stops)**:
- {presets}
**driver's freely input requirements**:
- freely input requirement takes priority over the selected requirements
- understand and try best to fulfill the input requirement, and create tags for them if applicable, each tag should not exceed 12 words
- freely input requirements are following: {free_text}

**output requirement**:
generate output which strictly follows below JSON schema:
{schema}",
            start_time = self.start_time,
            max_battery = vehicle.max_battery_kwh,
            start_soc = self.start_soc,
            max_soc = self.max_soc,
            min_soc = self.min_soc,
            rate = vehicle.charge_rate_kw,
            efficiency = vehicle.charge_efficiency,
            schema = response_format(),
        )
    }
}

/// The opening conversation for a trip: system role plus the user prompt.
pub fn initial_conversation(prompt: &PlanPrompt<'_>, vehicle: &VehicleConfig) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(prompt.user_message(vehicle)),
    ]
}

/// The follow-up message sent after a plan fails verification.
pub fn retry_feedback(diagnostic: &str) -> String {
    format!("{diagnostic}, review your plan and plan again.")
}

/// Structured-output format for the chat-completions request.
pub fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "rechargePlan",
            "strict": true,
            "schema": {
                "type": "object",
                "required": ["reason", "rechargingPlan"],
                "additionalProperties": false,
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "When it is not possible to make a plan, this field explains why, when a plan can be made return \"\" for this field."
                    },
                    "rechargingPlan": {
                        "type": "array",
                        "description": "When a plan can not be made, return empty array for this field. The \"fromStop\" field of the first item must be the start service stop of the journey",
                        "items": {
                            "type": "object",
                            "properties": {
                                "fromStop": {
                                    "type": "string",
                                    "description": "Journey start point or previous recharging service stop name"
                                },
                                "arrivalStop": {
                                    "type": "string",
                                    "description": "Current planned recharging service stop name"
                                },
                                "backupStop": {
                                    "type": "string",
                                    "description": "The backup service stop name for recharging in case the arrivalStop is out of service. Set this field to \"\" if no backupStop is needed."
                                },
                                "arrivalTime": {
                                    "type": "string",
                                    "description": "The estimated time of arriving arrivalStop, format as: HH:MM, HH is from 00 to 23"
                                },
                                "departureTime": {
                                    "type": "string",
                                    "description": "The estimated time of departing arrivalStop, format as: HH:MM, HH is from 00 to 23"
                                },
                                "socBeforeRecharge": {
                                    "type": "integer",
                                    "description": "The percentage of soc before recharging,  from 1 to 99, means 1% - 99%",
                                    "minimum": 1,
                                    "maximum": 99
                                },
                                "socAfterRecharge": {
                                    "type": "integer",
                                    "description": "The percentage of soc after recharging,  from 2 to 100, means 2% - 100%",
                                    "minimum": 2,
                                    "maximum": 100
                                },
                                "rechargeTime": {
                                    "type": "integer",
                                    "description": "Estimated time to complete recharging in minutes",
                                    "minimum": 1
                                },
                                "tags": {
                                    "type": "array",
                                    "description": "The tags that matching current service stop",
                                    "items": {
                                        "type": "string",
                                        "description": "The tag name"
                                    }
                                }
                            },
                            "required": [
                                "fromStop", "arrivalStop", "backupStop", "arrivalTime",
                                "departureTime", "socBeforeRecharge", "socAfterRecharge",
                                "rechargeTime", "tags"
                            ],
                            "additionalProperties": false
                        }
                    }
                }
            }
        }
    })
}
