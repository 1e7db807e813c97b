use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{
    CareLog, CareLogChanges, CareSetting, NewCareLog, NewCareSetting, ReflectionNote, User,
};
use super::store::CareStore;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    care_settings: Vec<CareSetting>,
    care_logs: Vec<CareLog>,
    reflection_notes: Vec<ReflectionNote>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn owner_uid_of_setting(&self, care_setting_id: i32) -> Option<&str> {
        let setting = self.care_settings.iter().find(|s| s.id == care_setting_id)?;
        self.users
            .iter()
            .find(|u| u.id == setting.user_id)
            .map(|u| u.firebase_uid.as_str())
    }
}

/// Process-local `CareStore` used by tests and by stub-mode development
/// servers that run without Postgres. Ids come from one shared sequence.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a user the way the sign-up flow would. Returns the existing
    /// row when the uid is already known.
    pub async fn insert_user(&self, firebase_uid: &str) -> User {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter().find(|u| u.firebase_uid == firebase_uid) {
            return user.clone();
        }
        let user = User {
            id: tables.next_id(),
            firebase_uid: firebase_uid.to_string(),
            email: None,
            created_at: Some(Utc::now()),
        };
        tables.users.push(user.clone());
        user
    }
}

#[async_trait]
impl CareStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_user_by_firebase_uid(&self, firebase_uid: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.firebase_uid == firebase_uid).cloned())
    }

    async fn find_care_setting_for_user(&self, user_id: i32) -> Result<Option<CareSetting>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .care_settings
            .iter()
            .filter(|s| s.user_id == user_id)
            .min_by_key(|s| s.id)
            .cloned())
    }

    async fn find_care_setting_owned_by(
        &self,
        care_setting_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareSetting>, DatabaseError> {
        let tables = self.tables.read().await;
        if tables.owner_uid_of_setting(care_setting_id) != Some(firebase_uid) {
            return Ok(None);
        }
        Ok(tables.care_settings.iter().find(|s| s.id == care_setting_id).cloned())
    }

    async fn insert_care_setting(&self, new: NewCareSetting) -> Result<CareSetting, DatabaseError> {
        let mut tables = self.tables.write().await;
        let setting = CareSetting {
            id: tables.next_id(),
            user_id: new.user_id,
            parent_name: Some(new.parent_name),
            child_name: Some(new.child_name),
            dog_name: Some(new.dog_name),
            care_start_date: Some(new.care_start_date),
            care_end_date: Some(new.care_end_date),
            morning_meal_time: Some(new.morning_meal_time),
            night_meal_time: Some(new.night_meal_time),
            walk_time: Some(new.walk_time),
            care_password: Some(new.care_password),
            care_clear_status: Some(new.care_clear_status),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tables.care_settings.push(setting.clone());
        Ok(setting)
    }

    async fn find_care_log_by_date(
        &self,
        care_setting_id: i32,
        date: &str,
    ) -> Result<Option<CareLog>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .care_logs
            .iter()
            .find(|l| l.care_setting_id == care_setting_id && l.date == date)
            .cloned())
    }

    async fn find_care_log_owned_by(
        &self,
        care_log_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareLog>, DatabaseError> {
        let tables = self.tables.read().await;
        let Some(log) = tables.care_logs.iter().find(|l| l.id == care_log_id) else {
            return Ok(None);
        };
        if tables.owner_uid_of_setting(log.care_setting_id) != Some(firebase_uid) {
            return Ok(None);
        }
        Ok(Some(log.clone()))
    }

    async fn insert_care_log(&self, new: NewCareLog) -> Result<CareLog, DatabaseError> {
        let mut tables = self.tables.write().await;
        let log = CareLog {
            id: tables.next_id(),
            care_setting_id: new.care_setting_id,
            date: new.date,
            fed_morning: Some(new.fed_morning),
            fed_night: Some(new.fed_night),
            walk_result: Some(new.walk_result),
            walk_total_distance_m: new.walk_total_distance_m,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tables.care_logs.push(log.clone());
        Ok(log)
    }

    async fn update_care_log(&self, care_log_id: i32, changes: CareLogChanges) -> Result<CareLog, DatabaseError> {
        let mut tables = self.tables.write().await;
        let log = tables
            .care_logs
            .iter_mut()
            .find(|l| l.id == care_log_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("care_log {}", care_log_id)))?;
        changes.apply_to(log);
        log.updated_at = Some(Utc::now());
        Ok(log.clone())
    }

    async fn list_care_logs(&self, care_setting_id: i32) -> Result<Vec<CareLog>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut logs: Vec<CareLog> = tables
            .care_logs
            .iter()
            .filter(|l| l.care_setting_id == care_setting_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(logs)
    }

    async fn insert_reflection_note(
        &self,
        care_setting_id: i32,
        content: &str,
    ) -> Result<ReflectionNote, DatabaseError> {
        let mut tables = self.tables.write().await;
        let note = ReflectionNote {
            id: tables.next_id(),
            care_setting_id,
            content: content.to_string(),
            approved_by_parent: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.reflection_notes.push(note.clone());
        Ok(note)
    }

    async fn find_reflection_note(&self, note_id: i32) -> Result<Option<ReflectionNote>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.reflection_notes.iter().find(|n| n.id == note_id).cloned())
    }

    async fn list_reflection_notes(&self, care_setting_id: i32) -> Result<Vec<ReflectionNote>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut notes: Vec<ReflectionNote> = tables
            .reflection_notes
            .iter()
            .filter(|n| n.care_setting_id == care_setting_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn set_reflection_note_approval(
        &self,
        note_id: i32,
        approved: bool,
    ) -> Result<ReflectionNote, DatabaseError> {
        let mut tables = self.tables.write().await;
        let note = tables
            .reflection_notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("reflection_note {}", note_id)))?;
        note.approved_by_parent = approved;
        note.updated_at = Some(Utc::now());
        Ok(note.clone())
    }
}
