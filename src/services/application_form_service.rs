use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application_form::{ApplicationAnswer, ApplicationQuestion};
use crate::workflow::form::QuestionPlan;

#[derive(Clone)]
pub struct ApplicationFormService {
    pool: PgPool,
}

impl ApplicationFormService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn questions(&self, job_id: Uuid) -> Result<Vec<ApplicationQuestion>> {
        let rows = sqlx::query_as::<_, ApplicationQuestion>(
            r#"
            SELECT * FROM job_application_questions
            WHERE job_id = $1
            ORDER BY order_index ASC, created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Swaps the job's whole form. Earlier answers keep their own copy of the question.
    pub async fn replace(
        &self,
        job_id: Uuid,
        questions: &[QuestionPlan],
    ) -> Result<Vec<ApplicationQuestion>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM job_application_questions WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;
        for q in questions {
            sqlx::query(
                r#"
                INSERT INTO job_application_questions
                    (job_id, question_text, field_type, options, is_required, order_index)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(job_id)
            .bind(&q.question_text)
            .bind(q.field_type.as_str())
            .bind(q.options.as_deref())
            .bind(q.is_required)
            .bind(q.order_index)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(%job_id, count = questions.len(), "application form saved");
        self.questions(job_id).await
    }

    pub async fn answers(&self, application_id: Uuid) -> Result<Vec<ApplicationAnswer>> {
        let rows = sqlx::query_as::<_, ApplicationAnswer>(
            r#"
            SELECT question_id, question_text, field_type, answer
            FROM application_answers
            WHERE application_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
