use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub status: String,
    pub assigned_recruiter_id: Option<Uuid>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate-facing row: application with job/company and interview fields denormalized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resume_id: Option<Uuid>,
    pub interview_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interview_state: Option<String>,
}

/// Recruiter-facing row: application with candidate contact and interview fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_user_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub resume_id: Option<Uuid>,
    pub resume_storage_key: Option<String>,
    pub status: String,
    pub assigned_recruiter_id: Option<Uuid>,
    pub assigned_recruiter_name: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interview_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interview_state: Option<String>,
}
