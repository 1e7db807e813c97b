pub mod care_log_service;
pub mod care_setting_service;
pub mod reflection_note_service;

pub use care_log_service::CareLogService;
pub use care_setting_service::CareSettingService;
pub use reflection_note_service::ReflectionNoteService;

use crate::database::models::{CareSetting, User};
use crate::database::CareStore;
use crate::error::{ApiError, ApiResult};

pub(crate) const USER_NOT_FOUND: &str = "User not found";
pub(crate) const CARE_SETTING_NOT_FOUND: &str = "Care setting not found";

/// subject -> user, 404 when the account was never provisioned.
pub(crate) async fn resolve_user(store: &dyn CareStore, subject: &str) -> ApiResult<User> {
    store
        .find_user_by_firebase_uid(subject)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

/// subject -> user -> first care setting, 404 on either miss.
pub(crate) async fn resolve_care_setting(store: &dyn CareStore, subject: &str) -> ApiResult<CareSetting> {
    let user = resolve_user(store, subject).await?;
    store
        .find_care_setting_for_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(CARE_SETTING_NOT_FOUND))
}
