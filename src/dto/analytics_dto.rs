use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplicationCount {
    pub job_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPerformanceRow {
    pub job_id: Uuid,
    pub title: String,
    pub total: i64,
    pub applied: i64,
    pub shortlisted: i64,
    pub interview: i64,
    pub offered: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPerformance {
    #[serde(flatten)]
    pub counts: JobPerformanceRow,
    pub shortlist_rate: f64,
    pub offer_rate: f64,
}

impl From<JobPerformanceRow> for JobPerformance {
    fn from(counts: JobPerformanceRow) -> Self {
        let rate = |n: i64| {
            if counts.total == 0 {
                0.0
            } else {
                n as f64 / counts.total as f64
            }
        };
        // anyone past the applied stage has been shortlisted at some point
        let shortlist_rate = rate(counts.shortlisted + counts.interview + counts.offered);
        let offer_rate = rate(counts.offered);
        Self {
            counts,
            shortlist_rate,
            offer_rate,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NeedingActionQuery {
    pub older_than_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateNeedingAction {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub candidate_name: String,
    pub status: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentResume {
    pub resume_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub original_filename: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
