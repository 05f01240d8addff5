use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub description_file_key: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_experience: Option<Decimal>,
    pub max_experience: Option<Decimal>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobWithCompany {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobShare {
    pub id: Uuid,
    pub job_id: Uuid,
    pub recruiter_id: Uuid,
    pub shared_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobShareDetail {
    pub job_id: Uuid,
    pub recruiter_id: Uuid,
    pub recruiter_name: String,
    pub recruiter_email: String,
    pub shared_by: Uuid,
    pub created_at: DateTime<Utc>,
}
