use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::models::{CareSetting, NewCareSetting};
use crate::database::CareStore;
use crate::error::ApiResult;
use crate::types::time_of_day;

use super::{resolve_care_setting, resolve_user};

#[derive(Debug, Clone, Deserialize)]
pub struct CareSettingCreateRequest {
    pub parent_name: String,
    pub child_name: String,
    pub dog_name: String,
    pub care_start_date: NaiveDate,
    pub care_end_date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub morning_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub night_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub walk_time: NaiveTime,
    pub care_password: String,
    #[serde(default)]
    pub care_clear_status: bool,
}

/// Full row as returned right after creation, PIN included.
#[derive(Debug, Clone, Serialize)]
pub struct CareSettingCreateResponse {
    pub id: i32,
    pub user_id: i32,
    pub parent_name: String,
    pub child_name: String,
    pub dog_name: String,
    pub care_start_date: NaiveDate,
    pub care_end_date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub morning_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub night_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub walk_time: NaiveTime,
    pub care_password: String,
    pub care_clear_status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read projection for `/me`. Leaves out the PIN and the clear status.
#[derive(Debug, Clone, Serialize)]
pub struct CareSettingMeResponse {
    pub id: i32,
    pub parent_name: String,
    pub child_name: String,
    pub dog_name: String,
    pub care_start_date: NaiveDate,
    pub care_end_date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub morning_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub night_meal_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub walk_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPinRequest {
    pub input_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPinResponse {
    pub verified: bool,
}

fn date_or_today(value: Option<NaiveDateTime>) -> NaiveDate {
    value.map(|dt| dt.date()).unwrap_or_else(|| Utc::now().date_naive())
}

fn time_or_now(value: Option<NaiveDateTime>) -> NaiveTime {
    value.map(|dt| dt.time()).unwrap_or_else(|| Utc::now().time())
}

impl From<CareSetting> for CareSettingCreateResponse {
    fn from(row: CareSetting) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            parent_name: row.parent_name.unwrap_or_default(),
            child_name: row.child_name.unwrap_or_default(),
            dog_name: row.dog_name.unwrap_or_default(),
            care_start_date: date_or_today(row.care_start_date),
            care_end_date: date_or_today(row.care_end_date),
            morning_meal_time: time_or_now(row.morning_meal_time),
            night_meal_time: time_or_now(row.night_meal_time),
            walk_time: time_or_now(row.walk_time),
            care_password: row.care_password.unwrap_or_default(),
            care_clear_status: row.care_clear_status.unwrap_or(false),
            created_at: row.created_at.unwrap_or_else(Utc::now),
            updated_at: row.updated_at,
        }
    }
}

impl From<CareSetting> for CareSettingMeResponse {
    fn from(row: CareSetting) -> Self {
        Self {
            id: row.id,
            parent_name: row.parent_name.unwrap_or_default(),
            child_name: row.child_name.unwrap_or_default(),
            dog_name: row.dog_name.unwrap_or_default(),
            care_start_date: date_or_today(row.care_start_date),
            care_end_date: date_or_today(row.care_end_date),
            morning_meal_time: time_or_now(row.morning_meal_time),
            night_meal_time: time_or_now(row.night_meal_time),
            walk_time: time_or_now(row.walk_time),
        }
    }
}

pub struct CareSettingService {
    store: Arc<dyn CareStore>,
}

impl CareSettingService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    /// Store one care setting for the caller. All three times of day are
    /// anchored to the care start date.
    pub async fn create(
        &self,
        subject: &str,
        request: CareSettingCreateRequest,
    ) -> ApiResult<CareSettingCreateResponse> {
        let user = resolve_user(self.store.as_ref(), subject).await?;

        let start = request.care_start_date;
        let new = NewCareSetting {
            user_id: user.id,
            parent_name: request.parent_name,
            child_name: request.child_name,
            dog_name: request.dog_name,
            care_start_date: start.and_time(NaiveTime::MIN),
            care_end_date: request.care_end_date.and_time(NaiveTime::MIN),
            morning_meal_time: start.and_time(request.morning_meal_time),
            night_meal_time: start.and_time(request.night_meal_time),
            walk_time: start.and_time(request.walk_time),
            care_password: request.care_password,
            care_clear_status: request.care_clear_status,
        };

        let setting = self.store.insert_care_setting(new).await?;
        info!(care_setting_id = setting.id, user_id = user.id, "created care setting");
        Ok(setting.into())
    }

    pub async fn get_mine(&self, subject: &str) -> ApiResult<CareSettingMeResponse> {
        let setting = resolve_care_setting(self.store.as_ref(), subject).await?;
        Ok(setting.into())
    }

    /// Compare the candidate PIN to the stored one. A caller without a care
    /// setting is simply not verified.
    pub async fn verify_pin(&self, subject: &str, request: VerifyPinRequest) -> ApiResult<VerifyPinResponse> {
        let user = resolve_user(self.store.as_ref(), subject).await?;
        let verified = match self.store.find_care_setting_for_user(user.id).await? {
            Some(setting) => setting.care_password.as_deref() == Some(request.input_password.as_str()),
            None => false,
        };
        Ok(VerifyPinResponse { verified })
    }
}
