use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicantRow, CandidateApplicationRow};
use crate::models::application_form::{ApplicationAnswer, ApplicationQuestion};
use crate::workflow::form::{AnswerInput, QuestionInput};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub message: String,
    pub application_id: Uuid,
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyApplication {
    pub application_id: Uuid,
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

impl From<CandidateApplicationRow> for MyApplication {
    fn from(row: CandidateApplicationRow) -> Self {
        Self {
            application_id: row.id,
            job_id: row.job_id,
            job_title: row.job_title,
            company_name: row.company_name,
            status: row.status,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
            resume_id: row.resume_id,
            interview_id: row.interview_id,
            scheduled_at: row.scheduled_at,
            interview_state: row.interview_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyApplicationsResponse {
    pub applications: Vec<MyApplication>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantView {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub resume_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    pub status: String,
    pub allows_interview_actions: bool,
    pub assigned_recruiter_id: Option<Uuid>,
    pub assigned_recruiter_name: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interview_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interview_state: Option<String>,
}

impl ApplicantView {
    pub fn from_row(row: ApplicantRow, resume_url: Option<String>) -> Self {
        let allows_interview_actions = crate::workflow::ApplicationStatus::parse(&row.status)
            .map(|s| s.allows_interview_actions())
            .unwrap_or(false);
        Self {
            application_id: row.id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            candidate_name: row.candidate_name,
            candidate_email: row.candidate_email,
            candidate_phone: row.candidate_phone,
            resume_id: row.resume_id,
            resume_url,
            status: row.status,
            allows_interview_actions,
            assigned_recruiter_id: row.assigned_recruiter_id,
            assigned_recruiter_name: row.assigned_recruiter_name,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
            interview_id: row.interview_id,
            scheduled_at: row.scheduled_at,
            interview_state: row.interview_state,
        }
    }
}

/// Single applicant with the answers given on the job's form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantDetail {
    #[serde(flatten)]
    pub applicant: ApplicantView,
    pub answers: Vec<ApplicationAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplicantsResponse {
    pub job_id: Uuid,
    pub job_title: String,
    pub count: usize,
    pub applications: Vec<ApplicantView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub application_id: Uuid,
    pub status: String,
    pub previous_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub application_id: Uuid,
    pub recruiter_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignPayload {
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignResponse {
    pub message: String,
    pub job_id: Uuid,
    pub assigned: usize,
}

pub type ApplicationFormPayload = Vec<QuestionInput>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationFormResponse {
    pub job_id: Uuid,
    pub questions: Vec<ApplicationQuestion>,
}
