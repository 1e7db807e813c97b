use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::TtlCache;
use crate::database::models::ReflectionNote;
use crate::database::CareStore;
use crate::error::{ApiError, ApiResult};

use super::resolve_care_setting;

const NOTE_FORBIDDEN: &str = "You do not have access to this reflection note";

#[derive(Debug, Clone, Deserialize)]
pub struct ReflectionNoteCreateRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReflectionNoteUpdateRequest {
    pub approved_by_parent: bool,
}

/// Key under which a subject's note list is cached.
pub fn cache_key(subject: &str) -> String {
    format!("reflection_notes:{}", subject)
}

pub struct ReflectionNoteService {
    store: Arc<dyn CareStore>,
    cache: Arc<TtlCache>,
}

impl ReflectionNoteService {
    pub fn new(store: Arc<dyn CareStore>, cache: Arc<TtlCache>) -> Self {
        Self { store, cache }
    }

    pub async fn create(&self, subject: &str, request: ReflectionNoteCreateRequest) -> ApiResult<ReflectionNote> {
        let setting = resolve_care_setting(self.store.as_ref(), subject).await?;
        let note = self.store.insert_reflection_note(setting.id, &request.content).await?;

        self.cache.invalidate(&cache_key(subject)).await;
        info!(note_id = note.id, care_setting_id = setting.id, "created reflection note");
        Ok(note)
    }

    /// Notes for the caller's care setting, newest first, as a JSON array.
    ///
    /// The serialized body is cached per subject, so repeated reads inside the
    /// TTL return identical bytes without touching the store.
    pub async fn list_json(&self, subject: &str) -> ApiResult<String> {
        let store = self.store.clone();
        self.cache
            .get_or_try_insert_with(&cache_key(subject), || async move {
                let setting = resolve_care_setting(store.as_ref(), subject).await?;
                let notes = store.list_reflection_notes(setting.id).await?;
                Ok::<_, ApiError>(serde_json::to_string(&notes)?)
            })
            .await
    }

    /// Flip the parent approval flag. Notes that are missing or belong to
    /// another setting are both forbidden.
    pub async fn update_approval(
        &self,
        note_id: i32,
        subject: &str,
        request: ReflectionNoteUpdateRequest,
    ) -> ApiResult<ReflectionNote> {
        let setting = resolve_care_setting(self.store.as_ref(), subject).await?;

        match self.store.find_reflection_note(note_id).await? {
            Some(note) if note.care_setting_id == setting.id => {}
            _ => {
                warn!(note_id, care_setting_id = setting.id, "reflection note not owned by caller");
                return Err(ApiError::forbidden(NOTE_FORBIDDEN));
            }
        }

        let note = self
            .store
            .set_reflection_note_approval(note_id, request.approved_by_parent)
            .await?;

        self.cache.invalidate(&cache_key(subject)).await;
        info!(note_id, approved = note.approved_by_parent, "updated reflection note approval");
        Ok(note)
    }
}
