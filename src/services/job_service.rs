use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, JobListResponse, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobWithCompany};
use crate::models::user::Recruiter;
use crate::workflow::access::{self, Capability, JobAccess};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, recruiter: &Recruiter, payload: CreateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                recruiter_id, company_id, title, description, description_file_key,
                location, employment_type, min_experience, max_experience,
                salary_min, salary_max
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(recruiter.id)
        .bind(recruiter.company_id)
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(payload.description_file_key.as_deref())
        .bind(payload.location.as_deref())
        .bind(payload.employment_type.as_deref())
        .bind(payload.min_experience)
        .bind(payload.max_experience)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(job_id = %job.id, recruiter_id = %recruiter.id, "job created");
        Ok(job)
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn get_with_company(&self, job_id: Uuid) -> Result<JobWithCompany> {
        sqlx::query_as::<_, JobWithCompany>(
            r#"
            SELECT j.*, c.name AS company_name
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE j.id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn list_active(&self, query: JobListQuery) -> Result<JobListResponse> {
        let (page, per_page, offset) = paginate(query.page, query.per_page)?;
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let location = query
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let employment_type = query
            .employment_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        const FILTER: &str = r#"
            j.is_active
            AND ($1::text IS NULL OR j.title ILIKE $1 OR j.location ILIKE $1 OR j.description ILIKE $1)
            AND ($2::text IS NULL OR j.location ILIKE $2)
            AND ($3::text IS NULL OR j.employment_type = $3)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM jobs j WHERE {}",
            FILTER
        ))
        .bind(search.as_deref())
        .bind(location.as_deref())
        .bind(employment_type)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, JobWithCompany>(&format!(
            r#"
            SELECT j.*, c.name AS company_name
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE {}
            ORDER BY j.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
            FILTER
        ))
        .bind(search.as_deref())
        .bind(location.as_deref())
        .bind(employment_type)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Ok(JobListResponse {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn list_owned(&self, recruiter_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn list_shared(&self, recruiter_id: Uuid) -> Result<Vec<JobWithCompany>> {
        let jobs = sqlx::query_as::<_, JobWithCompany>(
            r#"
            SELECT j.*, c.name AS company_name
            FROM job_shares s
            JOIN jobs j ON j.id = s.job_id
            JOIN companies c ON c.id = j.company_id
            WHERE s.recruiter_id = $1
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn access(&self, recruiter_id: Uuid, job: &Job) -> Result<Option<JobAccess>> {
        if job.recruiter_id == recruiter_id {
            return Ok(Some(JobAccess::Owner));
        }
        let shared = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM job_shares WHERE job_id = $1 AND recruiter_id = $2)",
        )
        .bind(job.id)
        .bind(recruiter_id)
        .fetch_one(&self.pool)
        .await?;
        let shared_with: &[Uuid] = if shared { &[recruiter_id] } else { &[] };
        Ok(JobAccess::resolve(recruiter_id, job.recruiter_id, shared_with))
    }

    /// Loads the job and checks the recruiter may exercise `capability` on it.
    pub async fn authorize(
        &self,
        recruiter_id: Uuid,
        job_id: Uuid,
        capability: Capability,
    ) -> Result<Job> {
        let job = self.get(job_id).await?;
        let access = self.access(recruiter_id, &job).await?;
        access::ensure(access, capability).map_err(|e| {
            tracing::warn!(%recruiter_id, %job_id, ?capability, "job access denied");
            e
        })?;
        Ok(job)
    }

    pub async fn update(
        &self,
        recruiter_id: Uuid,
        job_id: Uuid,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        let current = self.owned(recruiter_id, job_id).await?;

        let merged_min_exp = payload.min_experience.or(current.min_experience);
        let merged_max_exp = payload.max_experience.or(current.max_experience);
        let merged_min_sal = payload.salary_min.or(current.salary_min);
        let merged_max_sal = payload.salary_max.or(current.salary_max);
        if matches!((merged_min_exp, merged_max_exp), (Some(lo), Some(hi)) if lo > hi)
            || matches!((merged_min_sal, merged_max_sal), (Some(lo), Some(hi)) if lo > hi)
        {
            return Err(Error::BadRequest(
                "minimum must not exceed maximum".into(),
            ));
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                employment_type = COALESCE($6, employment_type),
                min_experience = COALESCE($7, min_experience),
                max_experience = COALESCE($8, max_experience),
                salary_min = COALESCE($9, salary_min),
                salary_max = COALESCE($10, salary_max),
                updated_at = NOW()
            WHERE id = $1 AND recruiter_id = $2
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(recruiter_id)
        .bind(payload.title.as_deref().map(str::trim))
        .bind(payload.description.as_deref())
        .bind(payload.location.as_deref())
        .bind(payload.employment_type.as_deref())
        .bind(payload.min_experience)
        .bind(payload.max_experience)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_owned)?;
        Ok(job)
    }

    pub async fn set_active(&self, recruiter_id: Uuid, job_id: Uuid, active: bool) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET is_active = $3, updated_at = NOW()
            WHERE id = $1 AND recruiter_id = $2
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(recruiter_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_owned)?;
        tracing::info!(%job_id, active, "job visibility changed");
        Ok(job)
    }

    /// Removes the job row; applications, shares and interviews cascade.
    pub async fn delete_permanently(&self, recruiter_id: Uuid, job_id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            "DELETE FROM jobs WHERE id = $1 AND recruiter_id = $2 RETURNING *",
        )
        .bind(job_id)
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_owned)?;
        tracing::info!(%job_id, %recruiter_id, "job permanently deleted");
        Ok(job)
    }

    pub async fn set_description_file(&self, job_id: Uuid, storage_key: &str) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET description_file_key = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(storage_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn owned(&self, recruiter_id: Uuid, job_id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 AND recruiter_id = $2")
            .bind(job_id)
            .bind(recruiter_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_owned)
    }
}

fn not_owned() -> Error {
    Error::NotFound("Job not found or not owned by you".into())
}

/// Normalizes page parameters into `(page, per_page, offset)`.
fn paginate(page: Option<i64>, per_page: Option<i64>) -> Result<(i64, i64, i64)> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| Error::BadRequest("page is out of range".into()))?;
    Ok((page, per_page, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(paginate(None, None).unwrap(), (1, DEFAULT_PER_PAGE, 0));
        assert_eq!(paginate(Some(-4), Some(0)).unwrap(), (1, 1, 0));
        assert_eq!(paginate(Some(3), Some(1000)).unwrap(), (3, MAX_PER_PAGE, 200));
    }

    #[test]
    fn huge_page_is_a_bad_request() {
        assert!(matches!(
            paginate(Some(i64::MAX), Some(100)),
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn list_active_rejects_overflowing_page_before_querying() {
        let pool = crate::database::pool::create_lazy_pool("postgres://localhost/unused").unwrap();
        let service = JobService::new(pool);
        let result = service
            .list_active(JobListQuery {
                page: Some(i64::MAX),
                per_page: Some(100),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}
