use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::database::models::ReflectionNote;
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::AuthSubject;
use crate::services::reflection_note_service::{ReflectionNoteCreateRequest, ReflectionNoteUpdateRequest};
use crate::state::AppState;

/// POST /api/reflection_notes
pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppJson(body): AppJson<ReflectionNoteCreateRequest>,
) -> ApiResult<(StatusCode, Json<ReflectionNote>)> {
    let note = state.reflection_notes().create(subject.as_str(), body).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/reflection_notes - body comes from the TTL cache when warm
pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<impl IntoResponse> {
    let body = state.reflection_notes().list_json(subject.as_str()).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

/// PATCH /api/reflection_notes/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    AppPath(note_id): AppPath<i32>,
    AppJson(body): AppJson<ReflectionNoteUpdateRequest>,
) -> ApiResult<Json<ReflectionNote>> {
    let note = state
        .reflection_notes()
        .update_approval(note_id, subject.as_str(), body)
        .await?;
    Ok(Json(note))
}
