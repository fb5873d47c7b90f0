//! Loading the care dashboard and home screen.
//!
//! Each fetch degrades on its own: a failed read is logged and replaced by
//! an empty result, so one broken source never blanks the whole screen.

use gastro_model::{DashboardView, HomeSummary, SignalOverrides, SymptomRecord, HISTORY_WINDOW};
use gastro_store::{Foods, SymptomRepository};
use tracing::{debug, warn};

/// History and today's record, fetched concurrently.
pub async fn load_dashboard(
    symptoms: &dyn SymptomRepository,
    user_id: &str,
    overrides: &SignalOverrides,
) -> DashboardView {
    let (history, today) = tokio::join!(
        symptoms.recent(user_id, HISTORY_WINDOW),
        symptoms.today(user_id)
    );

    let history = history.unwrap_or_else(|e| {
        warn!(user_id = %user_id, store = symptoms.kind(), error = %e, "Failed to load symptom history");
        Vec::new()
    });
    let today = today.unwrap_or_else(|e| {
        warn!(user_id = %user_id, store = symptoms.kind(), error = %e, "Failed to load today's symptoms");
        None
    });

    debug!(records = history.len(), has_today = today.is_some(), "Dashboard data loaded");
    DashboardView::build(&history, today.as_ref(), overrides)
}

/// Today's record plus safe foods matched to it.
pub async fn load_home(symptoms: &dyn SymptomRepository, foods: &Foods, user_id: &str) -> HomeSummary {
    let today: Option<SymptomRecord> = symptoms.today(user_id).await.unwrap_or_else(|e| {
        warn!(user_id = %user_id, error = %e, "Failed to load today's symptoms");
        None
    });

    let for_throat = HomeSummary::wants_throat_foods(today.as_ref());
    let safe = foods.get_safe(for_throat).await.unwrap_or_else(|e| {
        warn!(for_throat, error = %e, "Failed to load recommended foods");
        Vec::new()
    });

    HomeSummary::build(today, safe)
}
