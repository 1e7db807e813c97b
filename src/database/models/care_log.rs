use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareLog {
    pub id: i32,
    pub care_setting_id: i32,
    /// Calendar day as `YYYY-MM-DD`.
    pub date: String,
    pub fed_morning: Option<bool>,
    pub fed_night: Option<bool>,
    pub walk_result: Option<bool>,
    pub walk_total_distance_m: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewCareLog {
    pub care_setting_id: i32,
    pub date: String,
    pub fed_morning: bool,
    pub fed_night: bool,
    pub walk_result: bool,
    pub walk_total_distance_m: Option<f64>,
}

/// Partial update: `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareLogChanges {
    pub fed_morning: Option<bool>,
    pub fed_night: Option<bool>,
    pub walk_result: Option<bool>,
    pub walk_total_distance_m: Option<f64>,
}

impl CareLogChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, log: &mut CareLog) {
        if let Some(v) = self.fed_morning {
            log.fed_morning = Some(v);
        }
        if let Some(v) = self.fed_night {
            log.fed_night = Some(v);
        }
        if let Some(v) = self.walk_result {
            log.walk_result = Some(v);
        }
        if let Some(v) = self.walk_total_distance_m {
            log.walk_total_distance_m = Some(v);
        }
    }
}
