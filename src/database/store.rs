use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    CareLog, CareLogChanges, CareSetting, NewCareLog, NewCareSetting, ReflectionNote, User,
};

/// Typed table operations the services rely on.
///
/// Ownership-aware lookups (`*_owned_by`) join through `users.firebase_uid`
/// so a caller can never reach another household's rows by guessing ids.
#[async_trait]
pub trait CareStore: Send + Sync {
    /// Cheap connectivity probe for `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;

    // users
    async fn find_user_by_firebase_uid(&self, firebase_uid: &str) -> Result<Option<User>, DatabaseError>;

    // care_settings
    async fn find_care_setting_for_user(&self, user_id: i32) -> Result<Option<CareSetting>, DatabaseError>;
    async fn find_care_setting_owned_by(
        &self,
        care_setting_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareSetting>, DatabaseError>;
    async fn insert_care_setting(&self, new: NewCareSetting) -> Result<CareSetting, DatabaseError>;

    // care_logs
    async fn find_care_log_by_date(
        &self,
        care_setting_id: i32,
        date: &str,
    ) -> Result<Option<CareLog>, DatabaseError>;
    async fn find_care_log_owned_by(
        &self,
        care_log_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareLog>, DatabaseError>;
    async fn insert_care_log(&self, new: NewCareLog) -> Result<CareLog, DatabaseError>;
    async fn update_care_log(&self, care_log_id: i32, changes: CareLogChanges) -> Result<CareLog, DatabaseError>;
    /// All logs of a setting, oldest date first.
    async fn list_care_logs(&self, care_setting_id: i32) -> Result<Vec<CareLog>, DatabaseError>;

    // reflection_notes
    async fn insert_reflection_note(
        &self,
        care_setting_id: i32,
        content: &str,
    ) -> Result<ReflectionNote, DatabaseError>;
    async fn find_reflection_note(&self, note_id: i32) -> Result<Option<ReflectionNote>, DatabaseError>;
    /// All notes of a setting, newest first.
    async fn list_reflection_notes(&self, care_setting_id: i32) -> Result<Vec<ReflectionNote>, DatabaseError>;
    async fn set_reflection_note_approval(
        &self,
        note_id: i32,
        approved: bool,
    ) -> Result<ReflectionNote, DatabaseError>;
}
