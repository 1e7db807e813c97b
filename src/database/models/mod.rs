pub mod care_log;
pub mod care_setting;
pub mod reflection_note;
pub mod user;

pub use care_log::{CareLog, CareLogChanges, NewCareLog};
pub use care_setting::{CareSetting, NewCareSetting};
pub use reflection_note::ReflectionNote;
pub use user::User;
