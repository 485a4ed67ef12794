//! Stub weather tool used by the demo and the tests.
//!
//! There is no real weather lookup: every location reports 25 °C and sunny.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::registry::ToolRegistry;
use crate::types::tool::ToolDefinition;
use crate::Result;

pub const NAME: &str = "get_current_weather";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// The city and state, e.g. San Francisco, CA
    pub location: String,
    pub unit: TemperatureUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: i64,
    pub unit: TemperatureUnit,
    pub condition: String,
}

pub fn get_current_weather(args: WeatherArgs) -> WeatherReport {
    let temperature = match args.unit {
        TemperatureUnit::Celsius => 25,
        TemperatureUnit::Fahrenheit => 77,
    };
    WeatherReport {
        location: args.location,
        temperature,
        unit: args.unit,
        condition: "sunny".to_string(),
    }
}

pub fn definition() -> ToolDefinition {
    ToolDefinition::function(
        NAME,
        "Get the current weather in a given location",
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g. San Francisco, CA"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "The unit of measurement"
                }
            },
            "required": ["location", "unit"],
            "additionalProperties": false
        }),
    )
    .strict(true)
}

pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register_typed(definition(), |args: WeatherArgs| {
        Ok(get_current_weather(args))
    })
}
