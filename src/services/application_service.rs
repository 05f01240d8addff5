use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::Assignment;
use crate::error::{Error, Result};
use crate::models::application::{ApplicantRow, Application, CandidateApplicationRow};
use crate::models::application_form::ApplicationQuestion;
use crate::models::job::Job;
use crate::workflow::access::{Capability, JobAccess};
use crate::workflow::form::{check_answers, AnswerInput};
use crate::workflow::status::{plan_transition, Transition};
use crate::workflow::ApplicationStatus;

const APPLICANT_SELECT: &str = r#"
    SELECT a.id, a.job_id, a.candidate_id, cp.user_id AS candidate_user_id,
           u.full_name AS candidate_name, u.email AS candidate_email,
           u.phone_number AS candidate_phone,
           a.resume_id, r.storage_key AS resume_storage_key,
           a.status, a.assigned_recruiter_id, au.full_name AS assigned_recruiter_name,
           a.applied_at, a.updated_at,
           i.id AS interview_id, i.scheduled_at, i.state AS interview_state
    FROM applications a
    JOIN candidate_profiles cp ON cp.id = a.candidate_id
    JOIN users u ON u.id = cp.user_id
    LEFT JOIN resumes r ON r.id = a.resume_id
    LEFT JOIN recruiters ar ON ar.id = a.assigned_recruiter_id
    LEFT JOIN users au ON au.id = ar.user_id
    LEFT JOIN interviews i ON i.application_id = a.id
"#;

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submits an application; falls back to the candidate's primary resume.
    /// `questions` is the job's form, which the answers are checked against.
    pub async fn apply(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        resume_id: Option<Uuid>,
        questions: &[ApplicationQuestion],
        answers: &[AnswerInput],
    ) -> Result<Application> {
        let active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        if active != Some(true) {
            return Err(Error::NotFound("Job not found".into()));
        }

        let resume_id = match resume_id {
            Some(id) => {
                let owned = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM resumes WHERE id = $1 AND candidate_id = $2)",
                )
                .bind(id)
                .bind(candidate_id)
                .fetch_one(&self.pool)
                .await?;
                if !owned {
                    return Err(Error::NotFound("Resume not found or not yours".into()));
                }
                Some(id)
            }
            None => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM resumes WHERE candidate_id = $1 AND is_primary",
                )
                .bind(candidate_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE candidate_id = $1 AND job_id = $2)",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(already_applied());
        }
        let answers = check_answers(questions, answers)?;

        let mut tx = self.pool.begin().await?;
        // the unique constraint still catches a concurrent duplicate
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (candidate_id, job_id, resume_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(candidate_id)
        .bind(job_id)
        .bind(resume_id)
        .bind(ApplicationStatus::Applied.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => already_applied(),
            other => other,
        })?;

        for (position, (question_id, answer)) in answers.iter().enumerate() {
            let Some(question) = questions.iter().find(|q| q.id == *question_id) else {
                continue;
            };
            sqlx::query(
                r#"
                INSERT INTO application_answers
                    (application_id, question_id, question_text, field_type, answer, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(application.id)
            .bind(question.id)
            .bind(&question.question_text)
            .bind(&question.field_type)
            .bind(answer)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(application_id = %application.id, %job_id, %candidate_id, "application submitted");
        Ok(application)
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateApplicationRow>> {
        let rows = sqlx::query_as::<_, CandidateApplicationRow>(
            r#"
            SELECT a.id, a.job_id, j.title AS job_title, c.name AS company_name,
                   a.status, a.applied_at, a.updated_at, a.resume_id,
                   i.id AS interview_id, i.scheduled_at, i.state AS interview_state
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN companies c ON c.id = j.company_id
            LEFT JOIN interviews i ON i.application_id = a.id
            WHERE a.candidate_id = $1
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn withdraw(&self, candidate_id: Uuid, application_id: Uuid) -> Result<()> {
        let application = self.get(application_id).await?;
        if application.candidate_id != candidate_id {
            return Err(Error::Forbidden(
                "You can only withdraw your own applications".into(),
            ));
        }
        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(application_id)
            .execute(&self.pool)
            .await?;
        tracing::info!(%application_id, "application withdrawn");
        Ok(())
    }

    pub async fn get(&self, application_id: Uuid) -> Result<Application> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<ApplicantRow>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(&format!(
            "{} WHERE a.job_id = $1 ORDER BY a.applied_at DESC",
            APPLICANT_SELECT
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_applicant(&self, application_id: Uuid) -> Result<ApplicantRow> {
        sqlx::query_as::<_, ApplicantRow>(&format!("{} WHERE a.id = $1", APPLICANT_SELECT))
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    /// Applies a status change allowed by the workflow; same-status requests are no-ops.
    pub async fn update_status(
        &self,
        application: &Application,
        requested: ApplicationStatus,
    ) -> Result<Transition> {
        let current = ApplicationStatus::parse(&application.status)?;
        let transition = plan_transition(current, requested)?;
        if let Transition::Changed { to, .. } = transition {
            let result = sqlx::query(
                "UPDATE applications SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
            )
            .bind(application.id)
            .bind(to.as_str())
            .bind(current.as_str())
            .execute(&self.pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(Error::Conflict(
                    "Application status changed concurrently; reload and try again".into(),
                ));
            }
            tracing::info!(application_id = %application.id, from = %current, to = %to, "application status changed");
        }
        Ok(transition)
    }

    /// Assigns applications of `job` to recruiters who can see the job.
    pub async fn assign(
        &self,
        job: &Job,
        shared_with: &[Uuid],
        assignments: &[Assignment],
    ) -> Result<usize> {
        for assignment in assignments {
            let access = JobAccess::resolve(assignment.recruiter_id, job.recruiter_id, shared_with);
            if !access.is_some_and(|a| a.permits(Capability::ViewApplicants)) {
                return Err(Error::BadRequest(format!(
                    "Recruiter {} has no access to this job",
                    assignment.recruiter_id
                )));
            }
        }

        let ids: Vec<Uuid> = assignments.iter().map(|a| a.application_id).collect();
        let belonging = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM applications WHERE job_id = $1 AND id = ANY($2)",
        )
        .bind(job.id)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        if let Some(stray) = ids.iter().find(|id| !belonging.contains(id)) {
            return Err(Error::BadRequest(format!(
                "Application {} does not belong to this job",
                stray
            )));
        }

        let mut tx = self.pool.begin().await?;
        for assignment in assignments {
            sqlx::query(
                "UPDATE applications SET assigned_recruiter_id = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(assignment.application_id)
            .bind(assignment.recruiter_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(job_id = %job.id, count = assignments.len(), "applications assigned");
        Ok(assignments.len())
    }
}

fn already_applied() -> Error {
    Error::Conflict("You already applied for this job".into())
}
