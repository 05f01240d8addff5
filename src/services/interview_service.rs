use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::interview_dto::{
    CandidateInterview, CreateInterviewerPayload, InterviewDetail, SchedulePayload,
};
use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewSlot, Interviewer};
use crate::models::job::Job;
use crate::utils::time;
use crate::workflow::schedule::{
    ensure_future, plan_schedule, plan_slots, slot_start, ScheduleRequest, SlotInput, TimeWindow,
};
use crate::workflow::{InterviewState, ScheduleMode};

#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CandidateInterviewRow {
    #[sqlx(flatten)]
    interview: Interview,
    job_id: Uuid,
    job_title: String,
}

impl InterviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the interview for an application. A cancelled interview is replaced.
    pub async fn schedule(
        &self,
        recruiter_id: Uuid,
        job: &Job,
        application_id: Uuid,
        payload: &SchedulePayload,
    ) -> Result<Interview> {
        let request = ScheduleRequest {
            mode: payload.schedule_mode,
            interview_type: payload.interview_type,
            scheduled_at: payload.scheduled_at,
            meeting_link: payload.meeting_link.as_deref(),
            location: payload.location.as_deref(),
            interview_date: payload.interview_date,
            slots: &payload.slots,
        };
        let plan = plan_schedule(&request, time::now())?;

        let mut interviewer_ids = payload.interviewer_ids.clone();
        interviewer_ids.sort();
        interviewer_ids.dedup();
        let available = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM interviewers
            WHERE id = ANY($1) AND recruiter_id IN ($2, $3)
            "#,
        )
        .bind(&interviewer_ids)
        .bind(recruiter_id)
        .bind(job.recruiter_id)
        .fetch_one(&self.pool)
        .await?;
        if available != interviewer_ids.len() as i64 {
            return Err(Error::BadRequest(
                "Interviewers must belong to you or to the job owner".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE application_id = $1 FOR UPDATE",
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(existing) = existing {
            if InterviewState::parse(&existing.state)?.is_active() {
                return Err(Error::Conflict(
                    "An interview is already scheduled for this application".into(),
                ));
            }
            sqlx::query("DELETE FROM interviews WHERE id = $1")
                .bind(existing.id)
                .execute(&mut *tx)
                .await?;
        }

        let interview = sqlx::query_as::<_, Interview>(
            r#"
            INSERT INTO interviews (
                application_id, schedule_mode, interview_type, state,
                scheduled_at, meeting_link, location, scheduled_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(plan.mode.as_str())
        .bind(plan.interview_type.as_str())
        .bind(plan.state.as_str())
        .bind(plan.scheduled_at)
        .bind(plan.venue.meeting_link.as_deref())
        .bind(plan.venue.location.as_deref())
        .bind(recruiter_id)
        .fetch_one(&mut *tx)
        .await?;

        for interviewer_id in &interviewer_ids {
            sqlx::query(
                "INSERT INTO interview_interviewers (interview_id, interviewer_id) VALUES ($1, $2)",
            )
            .bind(interview.id)
            .bind(interviewer_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(date) = plan.slot_date {
            insert_slots(&mut tx, interview.id, date, &plan.windows).await?;
        }

        tx.commit().await?;
        tracing::info!(
            interview_id = %interview.id,
            %application_id,
            mode = plan.mode.as_str(),
            state = plan.state.as_str(),
            "interview scheduled"
        );
        Ok(interview)
    }

    /// Replaces the unselected slots of an interview still awaiting a choice.
    pub async fn propose_slots(
        &self,
        interview: &Interview,
        date: NaiveDate,
        slots: &[SlotInput],
    ) -> Result<Vec<InterviewSlot>> {
        if interview.schedule_mode != ScheduleMode::Slots.as_str()
            || InterviewState::parse(&interview.state)? != InterviewState::AwaitingSlot
        {
            return Err(Error::Conflict(
                "Slots can only be offered while the interview awaits a slot choice".into(),
            ));
        }
        let windows = plan_slots(date, slots, time::now())?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM interview_slots WHERE interview_id = $1 AND NOT is_selected")
            .bind(interview.id)
            .execute(&mut *tx)
            .await?;
        insert_slots(&mut tx, interview.id, date, &windows).await?;
        tx.commit().await?;

        self.slots(interview.id).await
    }

    pub async fn get(&self, interview_id: Uuid) -> Result<Interview> {
        sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
            .bind(interview_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".into()))
    }

    pub async fn for_application(&self, application_id: Uuid) -> Result<Interview> {
        sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE application_id = $1")
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("No interview found for this application".into()))
    }

    pub async fn detail(&self, interview: Interview) -> Result<InterviewDetail> {
        let interviewers = sqlx::query_as::<_, Interviewer>(
            r#"
            SELECT iv.* FROM interviewers iv
            JOIN interview_interviewers ii ON ii.interviewer_id = iv.id
            WHERE ii.interview_id = $1
            ORDER BY iv.name ASC
            "#,
        )
        .bind(interview.id)
        .fetch_all(&self.pool)
        .await?;
        let slots = self.slots(interview.id).await?;
        Ok(InterviewDetail {
            interview,
            interviewers,
            slots,
        })
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateInterview>> {
        let rows = sqlx::query_as::<_, CandidateInterviewRow>(
            r#"
            SELECT i.*, j.id AS job_id, j.title AS job_title
            FROM interviews i
            JOIN applications a ON a.id = i.application_id
            JOIN jobs j ON j.id = a.job_id
            WHERE a.candidate_id = $1
            ORDER BY i.scheduled_at ASC NULLS LAST, i.created_at DESC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CandidateInterview {
                detail: self.detail(row.interview).await?,
                job_id: row.job_id,
                job_title: row.job_title,
            });
        }
        Ok(out)
    }

    /// Candidate picks one of the offered slots. Only the first pick wins.
    pub async fn select_slot(
        &self,
        candidate_id: Uuid,
        interview_id: Uuid,
        slot_id: Uuid,
    ) -> Result<Interview> {
        let owned = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM interviews i
                JOIN applications a ON a.id = i.application_id
                WHERE i.id = $1 AND a.candidate_id = $2
            )
            "#,
        )
        .bind(interview_id)
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned {
            return Err(Error::NotFound("Interview not found".into()));
        }

        let slot = sqlx::query_as::<_, InterviewSlot>(
            "SELECT * FROM interview_slots WHERE id = $1 AND interview_id = $2",
        )
        .bind(slot_id)
        .bind(interview_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Slot not found".into()))?;

        let scheduled_at = slot_start(slot.slot_date, slot.start_time);
        ensure_future(scheduled_at, time::now())?;

        let mut tx = self.pool.begin().await?;
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET scheduled_at = $2, state = $3, updated_at = NOW()
            WHERE id = $1 AND state = $4
            RETURNING *
            "#,
        )
        .bind(interview_id)
        .bind(scheduled_at)
        .bind(InterviewState::Scheduled.as_str())
        .bind(InterviewState::AwaitingSlot.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            Error::Conflict("This interview is not awaiting a slot selection".into())
        })?;
        sqlx::query("UPDATE interview_slots SET is_selected = TRUE WHERE id = $1")
            .bind(slot.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(%interview_id, %slot_id, "interview slot selected");
        Ok(interview)
    }

    pub async fn reschedule(
        &self,
        application_id: Uuid,
        new_scheduled_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Interview> {
        let interview = self.for_application(application_id).await?;
        if !InterviewState::parse(&interview.state)?.is_active() {
            return Err(Error::Conflict(
                "A cancelled interview cannot be rescheduled; schedule a new one".into(),
            ));
        }
        ensure_future(new_scheduled_at, time::now())?;

        let mut tx = self.pool.begin().await?;
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET scheduled_at = $2, state = $3, updated_at = NOW()
            WHERE id = $1 AND state <> $4
            RETURNING *
            "#,
        )
        .bind(interview.id)
        .bind(new_scheduled_at)
        .bind(InterviewState::Rescheduled.as_str())
        .bind(InterviewState::Cancelled.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            Error::Conflict(
                "A cancelled interview cannot be rescheduled; schedule a new one".into(),
            )
        })?;
        // a fixed time supersedes any slots still on offer
        sqlx::query("DELETE FROM interview_slots WHERE interview_id = $1 AND NOT is_selected")
            .bind(interview.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(interview_id = %interview.id, %application_id, "interview rescheduled");
        Ok(interview)
    }

    /// Cancels the interview; the application's status is left untouched.
    pub async fn cancel(&self, application_id: Uuid) -> Result<Interview> {
        let interview = self.for_application(application_id).await?;
        if !InterviewState::parse(&interview.state)?.is_active() {
            return Err(Error::Conflict("Interview is already cancelled".into()));
        }

        let mut tx = self.pool.begin().await?;
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET scheduled_at = NULL, state = $2, cancelled_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(interview.id)
        .bind(InterviewState::Cancelled.as_str())
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM interview_slots WHERE interview_id = $1 AND NOT is_selected")
            .bind(interview.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(interview_id = %interview.id, %application_id, "interview cancelled");
        Ok(interview)
    }

    pub async fn interviewer_emails(&self, interview_id: Uuid) -> Result<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>(
            r#"
            SELECT iv.email FROM interviewers iv
            JOIN interview_interviewers ii ON ii.interviewer_id = iv.id
            WHERE ii.interview_id = $1
            "#,
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(emails)
    }

    async fn slots(&self, interview_id: Uuid) -> Result<Vec<InterviewSlot>> {
        let slots = sqlx::query_as::<_, InterviewSlot>(
            "SELECT * FROM interview_slots WHERE interview_id = $1 ORDER BY position ASC",
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    pub async fn list_interviewers(&self, recruiter_id: Uuid) -> Result<Vec<Interviewer>> {
        let rows = sqlx::query_as::<_, Interviewer>(
            "SELECT * FROM interviewers WHERE recruiter_id = $1 ORDER BY name ASC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_interviewer(
        &self,
        recruiter_id: Uuid,
        payload: &CreateInterviewerPayload,
    ) -> Result<Interviewer> {
        sqlx::query_as::<_, Interviewer>(
            "INSERT INTO interviewers (recruiter_id, name, email) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(recruiter_id)
        .bind(payload.name.trim())
        .bind(payload.email.trim().to_lowercase())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("An interviewer with this email already exists".into())
            }
            other => other,
        })
    }

    pub async fn delete_interviewer(&self, recruiter_id: Uuid, interviewer_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM interviewers WHERE id = $1 AND recruiter_id = $2")
            .bind(interviewer_id)
            .bind(recruiter_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Interviewer not found".into()));
        }
        Ok(())
    }
}

async fn insert_slots(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    interview_id: Uuid,
    date: NaiveDate,
    windows: &[TimeWindow],
) -> Result<()> {
    for (idx, window) in windows.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO interview_slots (interview_id, position, slot_date, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(interview_id)
        .bind(idx as i32 + 1)
        .bind(date)
        .bind(window.start)
        .bind(window.end)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
