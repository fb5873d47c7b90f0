//! Periodic health insights produced by an external process.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::risk::RiskLevel;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Period an insight summarises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Daily,
    Weekly,
    Monthly,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Daily => "daily",
            InsightType::Weekly => "weekly",
            InsightType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(InsightType::Daily),
            "weekly" => Ok(InsightType::Weekly),
            "monthly" => Ok(InsightType::Monthly),
            other => Err(ModelError::UnknownVariant {
                kind: "insight type",
                value: other.to_string(),
            }),
        }
    }
}

/// Metrics attached to an insight.
///
/// The producing job does not publish a schema, so this is kept as an opaque
/// JSON object. Readers should use [`InsightMetrics::number`] and friends
/// rather than assuming a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct InsightMetrics(
    #[cfg_attr(feature = "typescript", ts(type = "Record<string, unknown>"))]
    pub serde_json::Map<String, serde_json::Value>,
);

impl InsightMetrics {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(serde_json::Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `health_insights` row. Read-only for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct HealthInsight {
    pub id: String,
    pub user_id: String,
    pub insight_date: NaiveDate,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub metrics: InsightMetrics,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
}
