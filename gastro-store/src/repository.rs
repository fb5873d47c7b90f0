//! Symptom storage seam shared by guest and signed-in sessions.

use async_trait::async_trait;
use gastro_model::{NewSymptomRecord, SymptomRecord};

use crate::error::Result;
use crate::gateway::Symptoms;
use crate::guest::GuestSymptomStore;

/// Where a session's symptom records live.
#[async_trait]
pub trait SymptomRepository: Send + Sync {
    /// Short name for logs ("remote", "guest").
    fn kind(&self) -> &'static str;

    /// Append a record and return it as stored.
    async fn create(&self, record: NewSymptomRecord) -> Result<SymptomRecord>;

    /// Up to `limit` records, most recent first.
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<SymptomRecord>>;

    /// The latest record since local midnight.
    async fn today(&self, user_id: &str) -> Result<Option<SymptomRecord>>;
}

#[async_trait]
impl SymptomRepository for Symptoms {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn create(&self, record: NewSymptomRecord) -> Result<SymptomRecord> {
        Symptoms::create(self, &record).await
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<SymptomRecord>> {
        self.get_by_user(user_id, limit).await
    }

    async fn today(&self, user_id: &str) -> Result<Option<SymptomRecord>> {
        self.get_today(user_id).await
    }
}

#[async_trait]
impl SymptomRepository for GuestSymptomStore {
    fn kind(&self) -> &'static str {
        "guest"
    }

    async fn create(&self, record: NewSymptomRecord) -> Result<SymptomRecord> {
        GuestSymptomStore::create(self, record)
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<SymptomRecord>> {
        Ok(self.get_by_user(user_id, limit))
    }

    async fn today(&self, user_id: &str) -> Result<Option<SymptomRecord>> {
        Ok(self.get_today(user_id))
    }
}
