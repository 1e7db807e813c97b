use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account row created by the sign-up flow; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub firebase_uid: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
