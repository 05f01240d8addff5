use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationQuestion {
    pub id: Uuid,
    pub job_id: Uuid,
    pub question_text: String,
    pub field_type: String,
    pub options: Option<Vec<String>>,
    pub is_required: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Answer with the question as it read when the candidate applied.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationAnswer {
    pub question_id: Option<Uuid>,
    pub question_text: String,
    pub field_type: String,
    pub answer: String,
}
