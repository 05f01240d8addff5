use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub storage_key: String,
    pub original_filename: String,
    pub display_name: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}
