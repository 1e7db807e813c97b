use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::error::ApiResult;
use crate::extract::AppJson;
use crate::middleware::AuthSubject;
use crate::services::care_setting_service::{
    CareSettingCreateRequest, CareSettingCreateResponse, CareSettingMeResponse, VerifyPinRequest,
    VerifyPinResponse,
};
use crate::state::AppState;

/// POST /api/care_settings
pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppJson(body): AppJson<CareSettingCreateRequest>,
) -> ApiResult<(StatusCode, Json<CareSettingCreateResponse>)> {
    let created = state.care_settings().create(subject.as_str(), body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/care_settings/me
pub async fn me(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Json<CareSettingMeResponse>> {
    let setting = state.care_settings().get_mine(subject.as_str()).await?;
    Ok(Json(setting))
}

/// POST /api/care_settings/verify_pin
pub async fn verify_pin(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppJson(body): AppJson<VerifyPinRequest>,
) -> ApiResult<Json<VerifyPinResponse>> {
    let result = state.care_settings().verify_pin(subject.as_str(), body).await?;
    Ok(Json(result))
}
