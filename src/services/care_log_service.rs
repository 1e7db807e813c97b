use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::database::models::{CareLog, CareLogChanges, CareSetting, NewCareLog};
use crate::database::CareStore;
use crate::error::{ApiError, ApiResult};
use crate::types::normalize_date;

use super::CARE_SETTING_NOT_FOUND;

const USER_DOES_NOT_EXIST: &str = "User does not exist";
const CARE_LOG_NOT_FOUND: &str = "Care log not found";
const DUPLICATE_DATE: &str = "A care log already exists for this date, use PATCH to update it";
const INVALID_CARE_SETTING: &str = "Invalid care_setting_id";

#[derive(Debug, Clone, Deserialize)]
pub struct CareLogCreateRequest {
    /// Accepted for compatibility; the owning setting is always derived from the caller.
    pub care_setting_id: Option<i32>,
    pub date: String,
    #[serde(default)]
    pub fed_morning: bool,
    #[serde(default)]
    pub fed_night: bool,
    #[serde(default)]
    pub walk_result: bool,
    pub walk_total_distance_m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CareLogUpdateRequest {
    pub fed_morning: Option<bool>,
    pub fed_night: Option<bool>,
    pub walk_result: Option<bool>,
    pub walk_total_distance_m: Option<f64>,
}

impl From<CareLogUpdateRequest> for CareLogChanges {
    fn from(req: CareLogUpdateRequest) -> Self {
        Self {
            fed_morning: req.fed_morning,
            fed_night: req.fed_night,
            walk_result: req.walk_result,
            walk_total_distance_m: req.walk_total_distance_m,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareLogDateQuery {
    pub care_setting_id: i32,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareLogListQuery {
    pub care_setting_id: i32,
}

/// Day status used by the dashboard. An absent log reads as all-false.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CareLogDayResponse {
    pub care_log_id: Option<i32>,
    pub fed_morning: bool,
    pub fed_night: bool,
    pub walked: bool,
}

impl From<CareLog> for CareLogDayResponse {
    fn from(log: CareLog) -> Self {
        Self {
            care_log_id: Some(log.id),
            fed_morning: log.fed_morning.unwrap_or(false),
            fed_night: log.fed_night.unwrap_or(false),
            walked: log.walk_result.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CareLogSummary {
    pub id: i32,
    pub date: String,
    pub walk_result: Option<bool>,
    pub care_setting_id: i32,
}

impl From<CareLog> for CareLogSummary {
    fn from(log: CareLog) -> Self {
        Self {
            id: log.id,
            date: log.date,
            walk_result: log.walk_result,
            care_setting_id: log.care_setting_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CareLogListResponse {
    pub care_logs: Vec<CareLogSummary>,
}

pub struct CareLogService {
    store: Arc<dyn CareStore>,
}

impl CareLogService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    /// Create the log for one day of the caller's own care setting.
    pub async fn create(&self, subject: &str, request: CareLogCreateRequest) -> ApiResult<CareLog> {
        let user = self
            .store
            .find_user_by_firebase_uid(subject)
            .await?
            .ok_or_else(|| ApiError::unauthenticated(USER_DOES_NOT_EXIST))?;

        let setting = self
            .store
            .find_care_setting_for_user(user.id)
            .await?
            .ok_or_else(|| ApiError::not_found(CARE_SETTING_NOT_FOUND))?;

        if let Some(claimed) = request.care_setting_id {
            if claimed != setting.id {
                warn!(
                    claimed,
                    derived = setting.id,
                    "care_setting_id in request body ignored in favour of the caller's own"
                );
            }
        }

        let date = normalize_date(&request.date)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid date: {}", request.date)))?;

        // Check-then-insert; two concurrent creates for one date can both pass.
        if let Some(existing) = self.store.find_care_log_by_date(setting.id, &date).await? {
            debug!(care_log_id = existing.id, date = %date, "care log already exists");
            return Err(ApiError::conflict(DUPLICATE_DATE));
        }

        let log = self
            .store
            .insert_care_log(NewCareLog {
                care_setting_id: setting.id,
                date,
                fed_morning: request.fed_morning,
                fed_night: request.fed_night,
                walk_result: request.walk_result,
                walk_total_distance_m: request.walk_total_distance_m,
            })
            .await?;

        info!(care_log_id = log.id, care_setting_id = setting.id, date = %log.date, "created care log");
        Ok(log)
    }

    /// Apply the fields present in `request`. Missing and foreign logs are
    /// both reported as not found.
    pub async fn update(&self, care_log_id: i32, subject: &str, request: CareLogUpdateRequest) -> ApiResult<CareLog> {
        let existing = self
            .store
            .find_care_log_owned_by(care_log_id, subject)
            .await?
            .ok_or_else(|| ApiError::not_found(CARE_LOG_NOT_FOUND))?;

        let changes = CareLogChanges::from(request);
        if changes.is_empty() {
            return Ok(existing);
        }

        let log = self.store.update_care_log(care_log_id, changes).await?;
        info!(care_log_id, "updated care log");
        Ok(log)
    }

    /// Status of one day. Serves both `today` and `by_date`.
    pub async fn day_status(&self, query: CareLogDateQuery, subject: &str) -> ApiResult<CareLogDayResponse> {
        let setting = self.authorize_setting(query.care_setting_id, subject).await?;

        let date = normalize_date(&query.date).unwrap_or(query.date);
        let status = self
            .store
            .find_care_log_by_date(setting.id, &date)
            .await?
            .map(CareLogDayResponse::from)
            .unwrap_or_default();

        Ok(status)
    }

    pub async fn list(&self, query: CareLogListQuery, subject: &str) -> ApiResult<CareLogListResponse> {
        let setting = self.authorize_setting(query.care_setting_id, subject).await?;

        let care_logs = self
            .store
            .list_care_logs(setting.id)
            .await?
            .into_iter()
            .map(CareLogSummary::from)
            .collect::<Vec<_>>();

        debug!(care_setting_id = setting.id, count = care_logs.len(), "listed care logs");
        Ok(CareLogListResponse { care_logs })
    }

    async fn authorize_setting(&self, care_setting_id: i32, subject: &str) -> ApiResult<CareSetting> {
        self.store
            .find_care_setting_owned_by(care_setting_id, subject)
            .await?
            .ok_or_else(|| {
                warn!(care_setting_id, "care_setting_id not owned by caller");
                ApiError::forbidden(INVALID_CARE_SETTING)
            })
    }
}
