//! Typed access to the backend tables.
//!
//! Each resource handle is a cheap clone of the underlying [`RestClient`].
//! Reads that may legitimately find nothing return `Option`; every other
//! backend failure is returned as an error.

use std::cmp::Reverse;

use chrono::{DateTime, Local, NaiveDate, Utc};
use gastro_model::food::sort_by_safety;
use gastro_model::{
    start_of_day, Food, HealthInsight, InsightType, MealRecord, MealUpdate, NewMealRecord,
    NewProfile, NewSymptomRecord, Profile, ProfileUpdate, SafetyLevel, SymptomRecord,
};
use tracing::{debug, info};

use crate::client::{Query, RestClient};
use crate::config::BackendConfig;
use crate::error::Result;

const PROFILES: &str = "profiles";
const SYMPTOMS: &str = "symptom_records";
const FOODS: &str = "foods";
const MEALS: &str = "meal_records";
const INSIGHTS: &str = "health_insights";

/// Default page size for history reads.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Default page size for insight reads.
pub const DEFAULT_INSIGHT_LIMIT: usize = 10;

/// Entry point to the backend tables.
#[derive(Debug, Clone)]
pub struct DataGateway {
    rest: RestClient,
}

impl DataGateway {
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self::from_client(RestClient::new(config)?))
    }

    pub fn from_client(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn profiles(&self) -> Profiles {
        Profiles { rest: self.rest.clone() }
    }

    pub fn symptoms(&self) -> Symptoms {
        Symptoms { rest: self.rest.clone() }
    }

    pub fn foods(&self) -> Foods {
        Foods { rest: self.rest.clone() }
    }

    pub fn meals(&self) -> Meals {
        Meals { rest: self.rest.clone() }
    }

    pub fn insights(&self) -> Insights {
        Insights { rest: self.rest.clone() }
    }
}

// ==================== Profiles ====================

/// `profiles` table.
#[derive(Debug, Clone)]
pub struct Profiles {
    rest: RestClient,
}

impl Profiles {
    /// Create the profile at signup.
    pub async fn create(&self, profile: &NewProfile) -> Result<Profile> {
        info!(user_id = %profile.id, "Creating profile");
        self.rest.insert(PROFILES, profile).await
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let query = Query::select_all().eq("id", user_id);
        self.rest.fetch_one(PROFILES, &query).await
    }

    pub async fn update(&self, user_id: &str, updates: &ProfileUpdate) -> Result<Profile> {
        let query = Query::select_all().eq("id", user_id);
        self.rest.update(PROFILES, &query, updates).await
    }
}

// ==================== Symptoms ====================

/// `symptom_records` table. Append-only: there is no update or delete.
#[derive(Debug, Clone)]
pub struct Symptoms {
    rest: RestClient,
}

impl Symptoms {
    pub async fn create(&self, symptom: &NewSymptomRecord) -> Result<SymptomRecord> {
        symptom.validate()?;
        debug!(user_id = %symptom.user_id, pain = symptom.pain_level, "Recording symptom");
        self.rest.insert(SYMPTOMS, symptom).await
    }

    /// Most recent first.
    pub async fn get_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<SymptomRecord>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .order("recorded_at", false)
            .limit(limit);
        self.rest.fetch_many(SYMPTOMS, &query).await
    }

    /// Latest record since local midnight.
    pub async fn get_today(&self, user_id: &str) -> Result<Option<SymptomRecord>> {
        self.get_latest_since(user_id, start_of_day(&Local::now())).await
    }

    /// Latest record at or after `since`.
    pub async fn get_latest_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<SymptomRecord>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .gte("recorded_at", since.to_rfc3339())
            .order("recorded_at", false)
            .limit(1);
        self.rest.fetch_one(SYMPTOMS, &query).await
    }

    /// Records with `start <= recorded_at <= end`, most recent first.
    pub async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SymptomRecord>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .gte("recorded_at", start.to_rfc3339())
            .lte("recorded_at", end.to_rfc3339())
            .order("recorded_at", false);
        self.rest.fetch_many(SYMPTOMS, &query).await
    }
}

// ==================== Foods ====================

/// `foods` catalog. Read-only.
#[derive(Debug, Clone)]
pub struct Foods {
    rest: RestClient,
}

impl Foods {
    /// Case-insensitive substring search on name, safe foods first.
    pub async fn search(&self, term: &str) -> Result<Vec<Food>> {
        let query = Query::select_all()
            .ilike_contains("name", term)
            .order("safety_level", true);
        self.fetch_by_safety(&query).await
    }

    /// Foods in one category, safe foods first.
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<Food>> {
        let query = Query::select_all()
            .eq("category", category)
            .order("safety_level", true);
        self.fetch_by_safety(&query).await
    }

    /// Safe foods by name, optionally only those suited to throat discomfort.
    pub async fn get_safe(&self, for_throat: bool) -> Result<Vec<Food>> {
        let mut query = Query::select_all().eq("safety_level", SafetyLevel::Safe);
        if for_throat {
            query = query.eq("for_throat_discomfort", true);
        }
        self.rest.fetch_many(FOODS, &query.order("name", true)).await
    }

    /// The whole catalog by category, then name.
    pub async fn get_all(&self) -> Result<Vec<Food>> {
        let query = Query::select_all().order("category", true).order("name", true);
        self.rest.fetch_many(FOODS, &query).await
    }

    // The column may be plain text, which would sort avoid < caution < safe,
    // so the safety order is always applied here as well.
    async fn fetch_by_safety(&self, query: &Query) -> Result<Vec<Food>> {
        let mut foods: Vec<Food> = self.rest.fetch_many(FOODS, query).await?;
        sort_by_safety(&mut foods);
        Ok(foods)
    }
}

// ==================== Meals ====================

/// `meal_records` table.
#[derive(Debug, Clone)]
pub struct Meals {
    rest: RestClient,
}

impl Meals {
    pub async fn create(&self, meal: &NewMealRecord) -> Result<MealRecord> {
        debug!(user_id = %meal.user_id, meal_type = %meal.meal_type, "Recording meal");
        self.rest.insert(MEALS, meal).await
    }

    /// Newest day first, meals within a day in slot order.
    pub async fn get_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<MealRecord>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .order("meal_date", false)
            .order("meal_type", true)
            .limit(limit);
        let mut meals: Vec<MealRecord> = self.rest.fetch_many(MEALS, &query).await?;
        meals.sort_by_key(|m| (Reverse(m.meal_date), m.meal_type));
        Ok(meals)
    }

    pub async fn get_by_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<MealRecord>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .eq("meal_date", date)
            .order("meal_type", true);
        let mut meals: Vec<MealRecord> = self.rest.fetch_many(MEALS, &query).await?;
        meals.sort_by_key(|m| m.meal_type);
        Ok(meals)
    }

    pub async fn update(&self, id: &str, updates: &MealUpdate) -> Result<MealRecord> {
        let query = Query::select_all().eq("id", id);
        self.rest.update(MEALS, &query, updates).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        info!(meal_id = %id, "Deleting meal");
        self.rest.delete(MEALS, &Query::filter().eq("id", id)).await
    }
}

// ==================== Insights ====================

/// `health_insights` table. Read-only.
#[derive(Debug, Clone)]
pub struct Insights {
    rest: RestClient,
}

impl Insights {
    pub async fn get_latest(&self, user_id: &str) -> Result<Option<HealthInsight>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .order("insight_date", false)
            .limit(1);
        self.rest.fetch_one(INSIGHTS, &query).await
    }

    pub async fn get_by_type(
        &self,
        user_id: &str,
        insight_type: InsightType,
        limit: usize,
    ) -> Result<Vec<HealthInsight>> {
        let query = Query::select_all()
            .eq("user_id", user_id)
            .eq("type", insight_type.as_str())
            .order("insight_date", false)
            .limit(limit);
        self.rest.fetch_many(INSIGHTS, &query).await
    }
}
