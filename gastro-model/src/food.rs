//! Food catalog entries and safety grouping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Catalog classification of a food for gastritis.
///
/// Ordered `Safe < Caution < Avoid`; search results are sorted by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Caution,
    Avoid,
}

impl SafetyLevel {
    pub const ALL: [SafetyLevel; 3] = [SafetyLevel::Safe, SafetyLevel::Caution, SafetyLevel::Avoid];

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Caution => "caution",
            SafetyLevel::Avoid => "avoid",
        }
    }

    /// Short label shown next to a food.
    pub fn label(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "Recommended",
            SafetyLevel::Caution => "Eat with caution",
            SafetyLevel::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(SafetyLevel::Safe),
            "caution" => Ok(SafetyLevel::Caution),
            "avoid" => Ok(SafetyLevel::Avoid),
            other => Err(ModelError::UnknownVariant {
                kind: "safety level",
                value: other.to_string(),
            }),
        }
    }
}

/// A catalog food (`foods` row). Read-only for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Food {
    pub id: String,
    pub name: String,
    pub category: String,
    pub safety_level: SafetyLevel,
    #[serde(default)]
    pub calories_per_100g: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub preparation_tips: Option<String>,
    #[serde(default)]
    pub alternatives: Option<Vec<String>>,
    #[serde(default)]
    pub for_throat_discomfort: bool,
    pub created_at: DateTime<Utc>,
}

/// Search results split by safety level, each group in result order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FoodGroups {
    pub safe: Vec<Food>,
    pub caution: Vec<Food>,
    pub avoid: Vec<Food>,
}

impl FoodGroups {
    /// Every food lands in exactly one group.
    pub fn partition(foods: impl IntoIterator<Item = Food>) -> Self {
        let mut groups = Self::default();
        for food in foods {
            match food.safety_level {
                SafetyLevel::Safe => groups.safe.push(food),
                SafetyLevel::Caution => groups.caution.push(food),
                SafetyLevel::Avoid => groups.avoid.push(food),
            }
        }
        groups
    }

    pub fn get(&self, level: SafetyLevel) -> &[Food] {
        match level {
            SafetyLevel::Safe => &self.safe,
            SafetyLevel::Caution => &self.caution,
            SafetyLevel::Avoid => &self.avoid,
        }
    }

    pub fn len(&self) -> usize {
        self.safe.len() + self.caution.len() + self.avoid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty groups in safety order.
    pub fn iter(&self) -> impl Iterator<Item = (SafetyLevel, &[Food])> {
        SafetyLevel::ALL
            .into_iter()
            .map(move |level| (level, self.get(level)))
            .filter(|(_, foods)| !foods.is_empty())
    }
}

/// Stable sort by safety level; ties keep their incoming order.
pub fn sort_by_safety(foods: &mut [Food]) {
    foods.sort_by_key(|f| f.safety_level);
}

#[cfg(test)]
pub(crate) fn food(id: &str, name: &str, level: SafetyLevel) -> Food {
    Food {
        id: id.to_string(),
        name: name.to_string(),
        category: "staple".to_string(),
        safety_level: level,
        calories_per_100g: None,
        protein: None,
        fat: None,
        carbs: None,
        fiber: None,
        preparation_tips: None,
        alternatives: None,
        for_throat_discomfort: false,
        created_at: Utc::now(),
    }
}
