use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::{Interview, InterviewSlot, Interviewer};
use crate::workflow::schedule::SlotInput;
use crate::workflow::{InterviewType, ScheduleMode};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulePayload {
    pub application_id: Uuid,
    pub schedule_mode: ScheduleMode,
    pub interview_type: InterviewType,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 20))]
    pub interviewer_ids: Vec<Uuid>,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub interview_date: Option<NaiveDate>,
    #[serde(default)]
    pub slots: Vec<SlotInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub interview_id: Uuid,
    pub application_id: Uuid,
    pub state: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl ScheduleResponse {
    pub fn new(message: &str, interview: &Interview) -> Self {
        Self {
            message: message.to_string(),
            interview_id: interview.id,
            application_id: interview.application_id,
            state: interview.state.clone(),
            scheduled_at: interview.scheduled_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotDateQuery {
    pub interview_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleQuery {
    pub new_scheduled_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetail {
    #[serde(flatten)]
    pub interview: Interview,
    pub interviewers: Vec<Interviewer>,
    pub slots: Vec<InterviewSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInterview {
    #[serde(flatten)]
    pub detail: InterviewDetail,
    pub job_id: Uuid,
    pub job_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterviewerPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}
