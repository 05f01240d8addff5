use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::job::{Job, JobShareDetail};

#[derive(Clone)]
pub struct ShareService {
    pool: PgPool,
}

/// Result of a share call: the full grant list and who was newly added.
pub struct ShareOutcome {
    pub shared_with: Vec<JobShareDetail>,
    pub newly_granted: Vec<Uuid>,
}

impl ShareService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn share(&self, job: &Job, recruiter_ids: &[Uuid]) -> Result<ShareOutcome> {
        let mut targets: Vec<Uuid> = recruiter_ids
            .iter()
            .copied()
            .filter(|id| *id != job.recruiter_id)
            .collect();
        targets.sort();
        targets.dedup();

        if !targets.is_empty() {
            let known = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM recruiters WHERE id = ANY($1)",
            )
            .bind(&targets)
            .fetch_all(&self.pool)
            .await?;
            if let Some(missing) = targets.iter().find(|id| !known.contains(id)) {
                return Err(Error::NotFound(format!("Recruiter {} not found", missing)));
            }
        }

        let mut tx = self.pool.begin().await?;
        let mut newly_granted = Vec::new();
        for recruiter_id in &targets {
            let inserted = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO job_shares (job_id, recruiter_id, shared_by)
                VALUES ($1, $2, $3)
                ON CONFLICT (job_id, recruiter_id) DO NOTHING
                RETURNING recruiter_id
                "#,
            )
            .bind(job.id)
            .bind(recruiter_id)
            .bind(job.recruiter_id)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some(id) = inserted {
                newly_granted.push(id);
            }
        }
        tx.commit().await?;

        tracing::info!(job_id = %job.id, granted = newly_granted.len(), "job shared");
        Ok(ShareOutcome {
            shared_with: self.list(job.id).await?,
            newly_granted,
        })
    }

    pub async fn list(&self, job_id: Uuid) -> Result<Vec<JobShareDetail>> {
        let rows = sqlx::query_as::<_, JobShareDetail>(
            r#"
            SELECT s.job_id, s.recruiter_id, u.full_name AS recruiter_name,
                   u.email AS recruiter_email, s.shared_by, s.created_at
            FROM job_shares s
            JOIN recruiters r ON r.id = s.recruiter_id
            JOIN users u ON u.id = r.user_id
            WHERE s.job_id = $1
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn shared_recruiter_ids(&self, job_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT recruiter_id FROM job_shares WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn revoke(&self, job_id: Uuid, recruiter_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_shares WHERE job_id = $1 AND recruiter_id = $2")
            .bind(job_id)
            .bind(recruiter_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Share not found".into()));
        }
        tracing::info!(%job_id, %recruiter_id, "job share revoked");
        Ok(())
    }
}
