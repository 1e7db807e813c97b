use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    CareLog, CareLogChanges, CareSetting, NewCareLog, NewCareSetting, ReflectionNote, User,
};
use super::store::CareStore;

const CARE_SETTING_COLUMNS: &str = "cs.id, cs.user_id, cs.parent_name, cs.child_name, cs.dog_name, \
     cs.care_start_date, cs.care_end_date, cs.morning_meal_time, cs.night_meal_time, cs.walk_time, \
     cs.care_password, cs.care_clear_status, cs.created_at, cs.updated_at";

const CARE_LOG_COLUMNS: &str = "cl.id, cl.care_setting_id, cl.date, cl.fed_morning, cl.fed_night, \
     cl.walk_result, cl.walk_total_distance_m, cl.created_at, cl.updated_at";

const REFLECTION_NOTE_COLUMNS: &str =
    "id, care_setting_id, content, approved_by_parent, created_at, updated_at";

/// `CareStore` backed by Postgres through sqlx.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CareStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn find_user_by_firebase_uid(&self, firebase_uid: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firebase_uid, email, created_at FROM users WHERE firebase_uid = $1",
        )
        .bind(firebase_uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_care_setting_for_user(&self, user_id: i32) -> Result<Option<CareSetting>, DatabaseError> {
        let sql = format!(
            "SELECT {CARE_SETTING_COLUMNS} FROM care_settings cs WHERE cs.user_id = $1 ORDER BY cs.id LIMIT 1"
        );
        let setting = sqlx::query_as::<_, CareSetting>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(setting)
    }

    async fn find_care_setting_owned_by(
        &self,
        care_setting_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareSetting>, DatabaseError> {
        let sql = format!(
            "SELECT {CARE_SETTING_COLUMNS} FROM care_settings cs \
             JOIN users u ON u.id = cs.user_id \
             WHERE cs.id = $1 AND u.firebase_uid = $2"
        );
        let setting = sqlx::query_as::<_, CareSetting>(&sql)
            .bind(care_setting_id)
            .bind(firebase_uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(setting)
    }

    async fn insert_care_setting(&self, new: NewCareSetting) -> Result<CareSetting, DatabaseError> {
        let setting = sqlx::query_as::<_, CareSetting>(
            "INSERT INTO care_settings (
                 user_id, parent_name, child_name, dog_name, care_start_date, care_end_date,
                 morning_meal_time, night_meal_time, walk_time, care_password, care_clear_status
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, user_id, parent_name, child_name, dog_name, care_start_date, care_end_date,
                       morning_meal_time, night_meal_time, walk_time, care_password, care_clear_status,
                       created_at, updated_at",
        )
        .bind(new.user_id)
        .bind(&new.parent_name)
        .bind(&new.child_name)
        .bind(&new.dog_name)
        .bind(new.care_start_date)
        .bind(new.care_end_date)
        .bind(new.morning_meal_time)
        .bind(new.night_meal_time)
        .bind(new.walk_time)
        .bind(&new.care_password)
        .bind(new.care_clear_status)
        .fetch_one(&self.pool)
        .await?;

        Ok(setting)
    }

    async fn find_care_log_by_date(
        &self,
        care_setting_id: i32,
        date: &str,
    ) -> Result<Option<CareLog>, DatabaseError> {
        let sql = format!(
            "SELECT {CARE_LOG_COLUMNS} FROM care_logs cl \
             WHERE cl.care_setting_id = $1 AND cl.date = $2 ORDER BY cl.id LIMIT 1"
        );
        let log = sqlx::query_as::<_, CareLog>(&sql)
            .bind(care_setting_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    async fn find_care_log_owned_by(
        &self,
        care_log_id: i32,
        firebase_uid: &str,
    ) -> Result<Option<CareLog>, DatabaseError> {
        let sql = format!(
            "SELECT {CARE_LOG_COLUMNS} FROM care_logs cl \
             JOIN care_settings cs ON cs.id = cl.care_setting_id \
             JOIN users u ON u.id = cs.user_id \
             WHERE cl.id = $1 AND u.firebase_uid = $2"
        );
        let log = sqlx::query_as::<_, CareLog>(&sql)
            .bind(care_log_id)
            .bind(firebase_uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    async fn insert_care_log(&self, new: NewCareLog) -> Result<CareLog, DatabaseError> {
        let log = sqlx::query_as::<_, CareLog>(
            "INSERT INTO care_logs (
                 care_setting_id, date, fed_morning, fed_night, walk_result, walk_total_distance_m
             ) VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, care_setting_id, date, fed_morning, fed_night, walk_result,
                       walk_total_distance_m, created_at, updated_at",
        )
        .bind(new.care_setting_id)
        .bind(&new.date)
        .bind(new.fed_morning)
        .bind(new.fed_night)
        .bind(new.walk_result)
        .bind(new.walk_total_distance_m)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn update_care_log(&self, care_log_id: i32, changes: CareLogChanges) -> Result<CareLog, DatabaseError> {
        // COALESCE keeps the stored value for every field the caller left unset.
        let log = sqlx::query_as::<_, CareLog>(
            "UPDATE care_logs SET
                 fed_morning = COALESCE($2, fed_morning),
                 fed_night = COALESCE($3, fed_night),
                 walk_result = COALESCE($4, walk_result),
                 walk_total_distance_m = COALESCE($5, walk_total_distance_m),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, care_setting_id, date, fed_morning, fed_night, walk_result,
                       walk_total_distance_m, created_at, updated_at",
        )
        .bind(care_log_id)
        .bind(changes.fed_morning)
        .bind(changes.fed_night)
        .bind(changes.walk_result)
        .bind(changes.walk_total_distance_m)
        .fetch_optional(&self.pool)
        .await?;

        log.ok_or_else(|| DatabaseError::NotFound(format!("care_log {}", care_log_id)))
    }

    async fn list_care_logs(&self, care_setting_id: i32) -> Result<Vec<CareLog>, DatabaseError> {
        let sql = format!(
            "SELECT {CARE_LOG_COLUMNS} FROM care_logs cl \
             WHERE cl.care_setting_id = $1 ORDER BY cl.date ASC, cl.id ASC"
        );
        let logs = sqlx::query_as::<_, CareLog>(&sql)
            .bind(care_setting_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    async fn insert_reflection_note(
        &self,
        care_setting_id: i32,
        content: &str,
    ) -> Result<ReflectionNote, DatabaseError> {
        let sql = format!(
            "INSERT INTO reflection_notes (care_setting_id, content, approved_by_parent) \
             VALUES ($1, $2, false) RETURNING {REFLECTION_NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, ReflectionNote>(&sql)
            .bind(care_setting_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await?;

        Ok(note)
    }

    async fn find_reflection_note(&self, note_id: i32) -> Result<Option<ReflectionNote>, DatabaseError> {
        let sql = format!("SELECT {REFLECTION_NOTE_COLUMNS} FROM reflection_notes WHERE id = $1");
        let note = sqlx::query_as::<_, ReflectionNote>(&sql)
            .bind(note_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn list_reflection_notes(&self, care_setting_id: i32) -> Result<Vec<ReflectionNote>, DatabaseError> {
        let sql = format!(
            "SELECT {REFLECTION_NOTE_COLUMNS} FROM reflection_notes \
             WHERE care_setting_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let notes = sqlx::query_as::<_, ReflectionNote>(&sql)
            .bind(care_setting_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(notes)
    }

    async fn set_reflection_note_approval(
        &self,
        note_id: i32,
        approved: bool,
    ) -> Result<ReflectionNote, DatabaseError> {
        let sql = format!(
            "UPDATE reflection_notes SET approved_by_parent = $2, updated_at = now() \
             WHERE id = $1 RETURNING {REFLECTION_NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, ReflectionNote>(&sql)
            .bind(note_id)
            .bind(approved)
            .fetch_optional(&self.pool)
            .await?;

        note.ok_or_else(|| DatabaseError::NotFound(format!("reflection_note {}", note_id)))
    }
}
