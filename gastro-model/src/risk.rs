//! Risk classification and alert severity.
//!
//! Both are fixed decision tables over the latest observation, not models.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Pain at or above this is high risk on its own.
pub const HIGH_RISK_PAIN: u8 = 8;

/// Pain at or above this is at least medium risk.
pub const MEDIUM_RISK_PAIN: u8 = 5;

/// Pain at or above this on a new record raises a severe alert.
pub const SEVERE_ALERT_PAIN: u8 = 8;

/// Pain at or above this on a new record raises a moderate alert.
pub const MODERATE_ALERT_PAIN: u8 = 6;

/// Derived daily risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify today's risk.
///
/// `High` if pain >= 8 or acid reflux is present, else `Medium` if pain >= 5,
/// else `Low`. A missing reading counts as no pain.
pub fn classify_risk(pain_level: Option<u8>, acid_reflux: bool) -> RiskLevel {
    let pain = pain_level.unwrap_or(0);
    if pain >= HIGH_RISK_PAIN || acid_reflux {
        RiskLevel::High
    } else if pain >= MEDIUM_RISK_PAIN {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Severity of a real-time alert for a newly inserted symptom record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Moderate,
    Severe,
}

impl AlertSeverity {
    /// `None` means the record does not warrant an alert.
    pub fn from_pain(pain_level: u8) -> Option<Self> {
        if pain_level >= SEVERE_ALERT_PAIN {
            Some(AlertSeverity::Severe)
        } else if pain_level >= MODERATE_ALERT_PAIN {
            Some(AlertSeverity::Moderate)
        } else {
            None
        }
    }

    /// Text shown to the user when the alert fires.
    pub fn message(&self) -> &'static str {
        match self {
            AlertSeverity::Severe => {
                "Severe symptoms detected. Seek medical care or contact your doctor right away."
            }
            AlertSeverity::Moderate => {
                "Symptoms are getting worse. Rest and take your medication as prescribed."
            }
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Moderate => f.write_str("moderate"),
            AlertSeverity::Severe => f.write_str("severe"),
        }
    }
}
