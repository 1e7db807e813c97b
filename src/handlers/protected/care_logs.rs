use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::database::models::CareLog;
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthSubject;
use crate::services::care_log_service::{
    CareLogCreateRequest, CareLogDateQuery, CareLogDayResponse, CareLogListQuery, CareLogListResponse,
    CareLogUpdateRequest,
};
use crate::state::AppState;

/// POST /api/care_logs
pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppJson(body): AppJson<CareLogCreateRequest>,
) -> ApiResult<(StatusCode, Json<CareLog>)> {
    let log = state.care_logs().create(subject.as_str(), body).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// PATCH /api/care_logs/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppPath(care_log_id): AppPath<i32>,
    AppJson(body): AppJson<CareLogUpdateRequest>,
) -> ApiResult<Json<CareLog>> {
    let log = state.care_logs().update(care_log_id, subject.as_str(), body).await?;
    Ok(Json(log))
}

/// GET /api/care_logs/today?care_setting_id=&date=
pub async fn today(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppQuery(query): AppQuery<CareLogDateQuery>,
) -> ApiResult<Json<CareLogDayResponse>> {
    let status = state.care_logs().day_status(query, subject.as_str()).await?;
    Ok(Json(status))
}

/// GET /api/care_logs/by_date?care_setting_id=&date=
pub async fn by_date(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppQuery(query): AppQuery<CareLogDateQuery>,
) -> ApiResult<Json<CareLogDayResponse>> {
    let status = state.care_logs().day_status(query, subject.as_str()).await?;
    Ok(Json(status))
}

/// GET /api/care_logs/list?care_setting_id=
pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppQuery(query): AppQuery<CareLogListQuery>,
) -> ApiResult<Json<CareLogListResponse>> {
    let logs = state.care_logs().list(query, subject.as_str()).await?;
    Ok(Json(logs))
}
