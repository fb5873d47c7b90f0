//! Symptom observations.
//!
//! Records are append-only: the application never updates or deletes one
//! after it has been written.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Owner id used for records kept in the local guest store.
///
/// Never sent to the backend, so it does not reference a profile.
pub const GUEST_USER_ID: &str = "guest";

/// Highest accepted pain level.
pub const MAX_PAIN_LEVEL: u8 = 10;

/// Highest accepted appetite level.
pub const MAX_APPETITE_LEVEL: u8 = 5;

/// A stored symptom observation (`symptom_records` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SymptomRecord {
    pub id: String,
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
    /// 0 (none) to 10 (worst)
    pub pain_level: u8,
    pub throat_discomfort: bool,
    pub bloating: bool,
    pub acid_reflux: bool,
    pub nausea: bool,
    /// 0 (none) to 5 (normal)
    pub appetite_level: u8,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a symptom record; the id and `created_at` are assigned by
/// whichever store accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NewSymptomRecord {
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
    pub pain_level: u8,
    pub throat_discomfort: bool,
    pub bloating: bool,
    pub acid_reflux: bool,
    pub nausea: bool,
    pub appetite_level: u8,
    #[serde(default, deserialize_with = "crate::nullable::or_default")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewSymptomRecord {
    /// Create an observation recorded now with every flag cleared.
    pub fn new(user_id: impl Into<String>, pain_level: u8, appetite_level: u8) -> Self {
        Self {
            user_id: user_id.into(),
            recorded_at: Utc::now(),
            pain_level,
            throat_discomfort: false,
            bloating: false,
            acid_reflux: false,
            nausea: false,
            appetite_level,
            triggers: Vec::new(),
            notes: None,
        }
    }

    /// Set the observation time.
    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = at;
        self
    }

    pub fn with_acid_reflux(mut self, value: bool) -> Self {
        self.acid_reflux = value;
        self
    }

    pub fn with_throat_discomfort(mut self, value: bool) -> Self {
        self.throat_discomfort = value;
        self
    }

    pub fn with_bloating(mut self, value: bool) -> Self {
        self.bloating = value;
        self
    }

    pub fn with_nausea(mut self, value: bool) -> Self {
        self.nausea = value;
        self
    }

    /// Attach free-text notes. Blank notes are dropped.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    pub fn with_triggers(mut self, triggers: impl IntoIterator<Item = String>) -> Self {
        self.triggers = triggers.into_iter().collect();
        self
    }

    /// Check the range invariants and the owner id.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ModelError::Empty("user_id"));
        }
        if self.pain_level > MAX_PAIN_LEVEL {
            return Err(ModelError::PainOutOfRange {
                max: MAX_PAIN_LEVEL,
                actual: i64::from(self.pain_level),
            });
        }
        if self.appetite_level > MAX_APPETITE_LEVEL {
            return Err(ModelError::AppetiteOutOfRange {
                max: MAX_APPETITE_LEVEL,
                actual: i64::from(self.appetite_level),
            });
        }
        Ok(())
    }

    /// Materialise the stored form.
    pub fn into_record(self, id: impl Into<String>, created_at: DateTime<Utc>) -> SymptomRecord {
        SymptomRecord {
            id: id.into(),
            user_id: self.user_id,
            recorded_at: self.recorded_at,
            pain_level: self.pain_level,
            throat_discomfort: self.throat_discomfort,
            bloating: self.bloating,
            acid_reflux: self.acid_reflux,
            nausea: self.nausea,
            appetite_level: self.appetite_level,
            triggers: self.triggers,
            notes: self.notes,
            created_at,
        }
    }
}

/// Start of the calendar day containing `now`, in `now`'s timezone.
///
/// When local midnight does not exist (a DST jump at midnight) the wall-clock
/// time since midnight is subtracted instead.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(now.timezone()).earliest() {
        Some(start) => start.with_timezone(&Utc),
        None => now.with_timezone(&Utc) - (now.time() - NaiveTime::MIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(NewSymptomRecord::new("u1", 0, 0).validate().is_ok());
        assert!(NewSymptomRecord::new("u1", 10, 5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert_eq!(
            NewSymptomRecord::new("u1", 11, 3).validate(),
            Err(ModelError::PainOutOfRange { max: 10, actual: 11 })
        );
        assert_eq!(
            NewSymptomRecord::new("u1", 4, 6).validate(),
            Err(ModelError::AppetiteOutOfRange { max: 5, actual: 6 })
        );
        assert_eq!(
            NewSymptomRecord::new("  ", 4, 3).validate(),
            Err(ModelError::Empty("user_id"))
        );
    }

    #[test]
    fn test_wire_field_names() {
        let record = NewSymptomRecord::new("u1", 9, 1)
            .with_acid_reflux(true)
            .with_notes("after dinner")
            .into_record("r1", Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pain_level"], 9);
        assert_eq!(json["appetite_level"], 1);
        assert_eq!(json["acid_reflux"], true);
        assert_eq!(json["notes"], "after dinner");
        assert!(json.get("recorded_at").is_some());
    }

    #[test]
    fn test_start_of_day_uses_local_offset() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap();
        let start = start_of_day(&now);
        // 00:00 at +08:00 is 16:00 UTC the day before
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 15, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let record = NewSymptomRecord::new("u1", 2, 3).with_notes("   ");
        assert!(record.notes.is_none());
    }

    #[test]
    fn test_missing_triggers_default() {
        let json = serde_json::json!({
            "id": "r1",
            "user_id": "u1",
            "recorded_at": "2026-10-16T08:00:00Z",
            "pain_level": 3,
            "throat_discomfort": false,
            "bloating": true,
            "acid_reflux": false,
            "nausea": false,
            "appetite_level": 4,
            "created_at": "2026-10-16T08:00:01Z"
        });
        let record: SymptomRecord = serde_json::from_value(json).unwrap();
        assert!(record.triggers.is_empty());
        assert!(record.bloating);
    }

    #[test]
    fn test_null_triggers_default() {
        let json = serde_json::json!({
            "id": "r2",
            "user_id": "u1",
            "recorded_at": "2026-10-16T08:00:00Z",
            "pain_level": 6,
            "throat_discomfort": false,
            "bloating": false,
            "acid_reflux": true,
            "nausea": false,
            "appetite_level": 2,
            "triggers": null,
            "notes": null,
            "created_at": "2026-10-16T08:00:01Z"
        });
        let record: SymptomRecord = serde_json::from_value(json).unwrap();
        assert!(record.triggers.is_empty());
        assert!(record.notes.is_none());
    }
}
