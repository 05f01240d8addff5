use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::analytics_dto::{
    CandidateNeedingAction, JobApplicationCount, JobPerformance, JobPerformanceRow, RecentResume,
};
use crate::error::Result;
use crate::models::interview::UpcomingInterview;
use crate::workflow::ApplicationStatus;

/// Which jobs a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Jobs the recruiter owns or has been shared.
    Recruiter(Uuid),
}

impl Scope {
    fn recruiter_id(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Recruiter(id) => Some(*id),
        }
    }
}

// $1 is the recruiter id, NULL for the admin view
const JOB_SCOPE: &str = r#"
    ($1::uuid IS NULL
     OR j.recruiter_id = $1
     OR EXISTS (SELECT 1 FROM job_shares s WHERE s.job_id = j.id AND s.recruiter_id = $1))
"#;

pub const DEFAULT_OLDER_THAN_DAYS: i64 = 3;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn applications_per_job(&self, scope: Scope) -> Result<Vec<JobApplicationCount>> {
        let rows = sqlx::query_as::<_, JobApplicationCount>(&format!(
            r#"
            SELECT j.id AS job_id, j.title, j.is_active, COUNT(a.id) AS applications
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.id
            WHERE {}
            GROUP BY j.id, j.title, j.is_active
            ORDER BY applications DESC, j.title ASC
            "#,
            JOB_SCOPE
        ))
        .bind(scope.recruiter_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Counts per status, with every status present.
    pub async fn status_summary(&self, scope: Scope) -> Result<BTreeMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(&format!(
            r#"
            SELECT a.status, COUNT(*)
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE {}
            GROUP BY a.status
            "#,
            JOB_SCOPE
        ))
        .bind(scope.recruiter_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(zero_filled(rows))
    }

    pub async fn upcoming_interviews(&self, scope: Scope) -> Result<Vec<UpcomingInterview>> {
        let rows = sqlx::query_as::<_, UpcomingInterview>(&format!(
            r#"
            SELECT i.id AS interview_id, i.application_id, j.id AS job_id, j.title AS job_title,
                   u.full_name AS candidate_name, i.interview_type, i.state, i.scheduled_at
            FROM interviews i
            JOIN applications a ON a.id = i.application_id
            JOIN jobs j ON j.id = a.job_id
            JOIN candidate_profiles cp ON cp.id = a.candidate_id
            JOIN users u ON u.id = cp.user_id
            WHERE i.scheduled_at IS NOT NULL
              AND i.scheduled_at >= NOW()
              AND i.state <> 'cancelled'
              AND {}
            ORDER BY i.scheduled_at ASC
            LIMIT 50
            "#,
            JOB_SCOPE
        ))
        .bind(scope.recruiter_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn recent_resumes(&self) -> Result<Vec<RecentResume>> {
        let rows = sqlx::query_as::<_, RecentResume>(
            r#"
            SELECT r.id AS resume_id, r.candidate_id, u.full_name AS candidate_name,
                   r.original_filename, r.uploaded_at
            FROM resumes r
            JOIN candidate_profiles cp ON cp.id = r.candidate_id
            JOIN users u ON u.id = cp.user_id
            ORDER BY r.uploaded_at DESC
            LIMIT 20
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn job_performance(&self, scope: Scope) -> Result<Vec<JobPerformance>> {
        let rows = sqlx::query_as::<_, JobPerformanceRow>(&format!(
            r#"
            SELECT j.id AS job_id, j.title,
                   COUNT(a.id) AS total,
                   COUNT(a.id) FILTER (WHERE a.status = 'applied') AS applied,
                   COUNT(a.id) FILTER (WHERE a.status = 'shortlisted') AS shortlisted,
                   COUNT(a.id) FILTER (WHERE a.status = 'interview') AS interview,
                   COUNT(a.id) FILTER (WHERE a.status = 'offered') AS offered,
                   COUNT(a.id) FILTER (WHERE a.status = 'rejected') AS rejected
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.id
            WHERE {}
            GROUP BY j.id, j.title
            ORDER BY total DESC, j.title ASC
            "#,
            JOB_SCOPE
        ))
        .bind(scope.recruiter_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(JobPerformance::from).collect())
    }

    /// Stale `applied` applications and shortlisted ones with no active interview.
    pub async fn candidates_needing_action(
        &self,
        scope: Scope,
        older_than_days: Option<i64>,
    ) -> Result<Vec<CandidateNeedingAction>> {
        let days = older_than_days.unwrap_or(DEFAULT_OLDER_THAN_DAYS).max(0);
        let rows = sqlx::query_as::<_, CandidateNeedingAction>(&format!(
            r#"
            SELECT a.id AS application_id, j.id AS job_id, j.title AS job_title,
                   u.full_name AS candidate_name, a.status, a.applied_at,
                   CASE WHEN a.status = 'applied' THEN 'awaiting_review'
                        ELSE 'interview_not_scheduled' END AS reason
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN candidate_profiles cp ON cp.id = a.candidate_id
            JOIN users u ON u.id = cp.user_id
            LEFT JOIN interviews i ON i.application_id = a.id AND i.state <> 'cancelled'
            WHERE {}
              AND (
                (a.status = 'applied' AND a.applied_at < NOW() - make_interval(days => $2::int))
                OR (a.status = 'shortlisted' AND i.id IS NULL)
              )
            ORDER BY a.applied_at ASC
            "#,
            JOB_SCOPE
        ))
        .bind(scope.recruiter_id())
        .bind(days as i32)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn zero_filled(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut summary: BTreeMap<String, i64> = ApplicationStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for (status, count) in rows {
        *summary.entry(status).or_insert(0) += count;
    }
    summary
}
