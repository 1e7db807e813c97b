use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A household's care configuration. Most columns are nullable in the
/// schema, so readers coalesce before handing values to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareSetting {
    pub id: i32,
    pub user_id: i32,
    pub parent_name: Option<String>,
    pub child_name: Option<String>,
    pub dog_name: Option<String>,
    pub care_start_date: Option<NaiveDateTime>,
    pub care_end_date: Option<NaiveDateTime>,
    pub morning_meal_time: Option<NaiveDateTime>,
    pub night_meal_time: Option<NaiveDateTime>,
    pub walk_time: Option<NaiveDateTime>,
    pub care_password: Option<String>,
    pub care_clear_status: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewCareSetting {
    pub user_id: i32,
    pub parent_name: String,
    pub child_name: String,
    pub dog_name: String,
    pub care_start_date: NaiveDateTime,
    pub care_end_date: NaiveDateTime,
    pub morning_meal_time: NaiveDateTime,
    pub night_meal_time: NaiveDateTime,
    pub walk_time: NaiveDateTime,
    pub care_password: String,
    pub care_clear_status: bool,
}
