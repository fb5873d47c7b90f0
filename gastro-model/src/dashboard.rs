//! View models for the care dashboard and the home screen.

use serde::Serialize;

use crate::care::{daily_checklist, select_care_tips, suggested_food_query, CareSignals, CareTips, LOW_APPETITE_LEVEL};
use crate::food::Food;
use crate::risk::{classify_risk, RiskLevel};
use crate::symptom::SymptomRecord;
use crate::trend::{appetite_series, pain_series};

/// Number of foods suggested on the home screen and dashboard.
pub const SUGGESTED_FOOD_COUNT: usize = 6;

/// Signals the user toggled by hand. `None` keeps the value from today's record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalOverrides {
    pub acid_reflux: Option<bool>,
    pub throat_discomfort: Option<bool>,
    pub poor_appetite: Option<bool>,
}

/// Everything the care dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub risk: RiskLevel,
    pub today_pain: Option<u8>,
    pub today_appetite: Option<u8>,
    /// Oldest first
    pub pain_series: Vec<u8>,
    /// Oldest first
    pub appetite_series: Vec<u8>,
    pub signals: CareSignals,
    /// `None` when no signal is active
    pub care_tips: Option<CareTips>,
    pub checklist: Vec<&'static str>,
    pub food_query: &'static str,
    pub has_history: bool,
}

impl DashboardView {
    /// Derive the dashboard from recent history (most recent first) and
    /// today's record.
    ///
    /// Signals start from today's record, a missing appetite reading counts as
    /// normal, and overrides win. Risk follows today's pain and the effective
    /// reflux signal.
    pub fn build(
        history: &[SymptomRecord],
        today: Option<&SymptomRecord>,
        overrides: &SignalOverrides,
    ) -> Self {
        let acid_reflux = overrides
            .acid_reflux
            .unwrap_or_else(|| today.is_some_and(|t| t.acid_reflux));
        let throat_discomfort = overrides
            .throat_discomfort
            .unwrap_or_else(|| today.is_some_and(|t| t.throat_discomfort));
        let poor_appetite = overrides
            .poor_appetite
            .unwrap_or_else(|| today.is_some_and(|t| t.appetite_level <= LOW_APPETITE_LEVEL));

        let signals = CareSignals {
            acid_reflux,
            throat_discomfort,
            appetite_level: None,
        }
        .with_poor_appetite(poor_appetite);

        let today_pain = today.map(|t| t.pain_level);

        Self {
            risk: classify_risk(today_pain, signals.acid_reflux),
            today_pain,
            today_appetite: today.map(|t| t.appetite_level),
            pain_series: pain_series(history),
            appetite_series: appetite_series(history),
            care_tips: select_care_tips(&signals),
            checklist: daily_checklist(&signals),
            food_query: suggested_food_query(&signals),
            has_history: !history.is_empty(),
            signals,
        }
    }
}

/// The home screen: today's record, its risk, and a few safe foods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSummary {
    pub today: Option<SymptomRecord>,
    pub risk: RiskLevel,
    pub recommended: Vec<Food>,
}

impl HomeSummary {
    /// Whether the recommendation list should be limited to throat-soothing foods.
    pub fn wants_throat_foods(today: Option<&SymptomRecord>) -> bool {
        today.is_some_and(|t| t.throat_discomfort)
    }

    pub fn build(today: Option<SymptomRecord>, safe_foods: Vec<Food>) -> Self {
        let risk = classify_risk(
            today.as_ref().map(|t| t.pain_level),
            today.as_ref().is_some_and(|t| t.acid_reflux),
        );
        let mut recommended = safe_foods;
        recommended.truncate(SUGGESTED_FOOD_COUNT);
        Self {
            today,
            risk,
            recommended,
        }
    }
}
