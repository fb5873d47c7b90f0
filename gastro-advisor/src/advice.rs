//! Typed advice and the tolerant parser for model output.

use gastro_model::SafetyLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Longest slice of raw output kept as the reason of degraded advice.
pub const RAW_REASON_CHARS: usize = 200;

/// Reason used when the model gave a level but no explanation.
pub const MISSING_REASON: &str = "No reason provided";

/// Reason used when the model output is unusable and empty.
pub const UNAVAILABLE_REASON: &str = "The advisory service is temporarily unavailable, please try again later.";

/// The model's judgment about one food. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FoodAdvice {
    pub level: SafetyLevel,
    pub reason: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_tips: Option<String>,
}

impl FoodAdvice {
    /// Conservative advice built from unusable output.
    pub fn degraded(raw: &str) -> Self {
        let snippet: String = raw.trim().chars().take(RAW_REASON_CHARS).collect();
        Self {
            level: SafetyLevel::Caution,
            reason: if snippet.is_empty() {
                UNAVAILABLE_REASON.to_string()
            } else {
                snippet
            },
            alternatives: Vec::new(),
            preparation_tips: None,
        }
    }
}

/// Result of [`parse_advice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAdvice {
    pub advice: FoodAdvice,
    /// Output was not a JSON object, or its level was missing or unknown.
    pub degraded: bool,
}

/// Turn model output into advice. Never fails.
///
/// - not a JSON object: `caution`, reason is the start of the raw text
/// - missing or unknown `level`: `caution`
/// - missing `reason`: [`MISSING_REASON`]
/// - non-string alternatives are skipped; a blank `preparationTips` is dropped
pub fn parse_advice(content: &str) -> ParsedAdvice {
    let object = match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        _ => {
            return ParsedAdvice {
                advice: FoodAdvice::degraded(content),
                degraded: true,
            }
        }
    };

    let level = object
        .get("level")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<SafetyLevel>().ok());

    let advice = FoodAdvice {
        level: level.unwrap_or(SafetyLevel::Caution),
        reason: text_field(&object, "reason").unwrap_or_else(|| MISSING_REASON.to_string()),
        alternatives: object
            .get("alternatives")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        preparation_tips: text_field(&object, "preparationTips"),
    };

    ParsedAdvice {
        advice,
        degraded: level.is_none(),
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
