//! Persistence for gastritis tracking.
//!
//! Two interchangeable homes for symptom records:
//!
//! - [`DataGateway`] talks to the hosted backend's REST interface and covers
//!   profiles, symptoms, foods, meals and insights.
//! - [`GuestSymptomStore`] keeps symptom records in a local key-value store
//!   for unauthenticated use. Nothing in it is ever synced.
//!
//! Both implement [`SymptomRepository`], so callers pick one per session and
//! write the rest of their code once. [`RealtimeClient`] delivers newly
//! inserted symptom rows as alerts.
//!
//! # Example
//!
//! ```rust,no_run
//! use gastro_store::{BackendConfig, DataGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = DataGateway::new(BackendConfig {
//!     url: "https://project.supabase.co".into(),
//!     anon_key: "public-anon-key".into(),
//!     ..Default::default()
//! })?;
//!
//! let history = gateway.symptoms().get_by_user("user-id", 14).await?;
//! let today = gateway.symptoms().get_today("user-id").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guest;
pub mod realtime;
pub mod repository;

pub use client::RestClient;
pub use config::BackendConfig;
pub use error::{Result, StoreError};
pub use gateway::{DataGateway, Foods, Insights, Meals, Profiles, Symptoms};
pub use guest::{
    FileKeyValueStore, GuestSymptomStore, KeyValueStore, MemoryKeyValueStore, GUEST_SYMPTOMS_BACKUP_KEY,
    GUEST_SYMPTOMS_KEY,
};
pub use realtime::{RealtimeClient, Subscription, SymptomAlert};
pub use repository::SymptomRepository;
