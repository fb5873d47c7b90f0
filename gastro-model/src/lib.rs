//! Gastro Model - shared types and derived-state logic
//!
//! Everything in this crate is pure: no I/O, no clocks except where a caller
//! passes one in. The store and advisor crates build on these types, and the
//! application layer turns them into views.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Records    │──▶│ Risk / Trend │──▶│  Dashboard   │
//! │ (symptom,    │   │   engine     │   │  view model  │
//! │  food, meal) │   └──────────────┘   └──────┬───────┘
//! └──────────────┘                             │
//!                         ┌────────────────────┘
//!                         ▼
//!                  ┌──────────────┐
//!                  │  Care tips   │
//!                  └──────────────┘
//! ```

pub mod care;
pub mod dashboard;
pub mod error;
pub mod food;
pub mod insight;
pub mod meal;
pub mod nullable;
pub mod profile;
pub mod risk;
pub mod symptom;
pub mod trend;

pub use care::{
    daily_checklist, select_care_tips, suggested_food_query, CareSignals, CareTipBlock, CareTips,
    CareTopic,
};
pub use dashboard::{DashboardView, HomeSummary, SignalOverrides};
pub use error::{ModelError, Result};
pub use food::{Food, FoodGroups, SafetyLevel};
pub use insight::{HealthInsight, InsightMetrics, InsightType};
pub use meal::{MealFoodItem, MealRecord, MealType, MealUpdate, NewMealRecord, SymptomSnapshot};
pub use profile::{Gender, Medication, NewProfile, Profile, ProfileUpdate, Severity};
pub use risk::{classify_risk, AlertSeverity, RiskLevel};
pub use symptom::{start_of_day, NewSymptomRecord, SymptomRecord, GUEST_USER_ID};
pub use trend::{appetite_series, pain_series, sparkline, HISTORY_WINDOW};
