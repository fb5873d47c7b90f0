//! Logged meals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Meal slot within a day. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(ModelError::UnknownVariant {
                kind: "meal type",
                value: other.to_string(),
            }),
        }
    }
}

/// One food eaten as part of a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MealFoodItem {
    pub food_id: String,
    pub amount: f64,
    pub unit: String,
}

/// How the user felt after a meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SymptomSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<u8>,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub bloating: bool,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub acid_reflux: bool,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub nausea: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A logged meal (`meal_records` row). Mutable and deletable by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MealRecord {
    pub id: String,
    pub user_id: String,
    pub meal_date: NaiveDate,
    pub meal_type: MealType,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub foods: Vec<MealFoodItem>,
    #[serde(default)]
    pub symptoms_after: Option<SymptomSnapshot>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealRecord {
    pub user_id: String,
    pub meal_date: NaiveDate,
    pub meal_type: MealType,
    pub foods: Vec<MealFoodItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms_after: Option<SymptomSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewMealRecord {
    pub fn new(user_id: impl Into<String>, meal_date: NaiveDate, meal_type: MealType) -> Self {
        Self {
            user_id: user_id.into(),
            meal_date,
            meal_type,
            foods: Vec::new(),
            symptoms_after: None,
            photo_url: None,
            notes: None,
        }
    }

    pub fn with_food(mut self, food_id: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        self.foods.push(MealFoodItem {
            food_id: food_id.into(),
            amount,
            unit: unit.into(),
        });
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }
}

/// Partial meal update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foods: Option<Vec<MealFoodItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms_after: Option<SymptomSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
