use std::time::Duration;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, DescriptionFileResponse, JobDashboardResponse, JobListQuery,
        UpdateJobPayload,
    },
    error::{Error, Result},
    middleware::auth::{RecruiterContext, RequestContext, Role},
    models::job::JobWithCompany,
    services::resume_service::{inspect_document, DEFAULT_LINK_TTL_SECS},
    workflow::Capability,
    AppState,
};

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = Job),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Recruiter role required")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(&ctx.recruiter, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("search" = Option<String>, Query, description = "Matches title, location or description"),
        ("location" = Option<String>, Query, description = "Filter by location"),
        ("employment_type" = Option<String>, Query, description = "Filter by employment type"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Active jobs, newest first", body = JobListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.list_active(query).await?))
}

pub async fn my_jobs(
    State(state): State<AppState>,
    ctx: RecruiterContext,
) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.list_owned(ctx.recruiter_id()).await?))
}

#[utoipa::path(
    get,
    path = "/jobs/dashboard",
    responses(
        (status = 200, description = "Owned and shared jobs", body = JobDashboardResponse)
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: RecruiterContext,
) -> Result<impl IntoResponse> {
    let owned_jobs = state.job_service.list_owned(ctx.recruiter_id()).await?;
    let shared_jobs = state.job_service.list_shared(ctx.recruiter_id()).await?;
    Ok(Json(JobDashboardResponse {
        owned_jobs,
        shared_jobs,
    }))
}

/// Archived jobs are only visible to admins and to recruiters with access.
pub(crate) async fn visible_job(state: &AppState, ctx: &RequestContext, job_id: Uuid) -> Result<JobWithCompany> {
    let job = state.job_service.get_with_company(job_id).await?;
    if job.job.is_active || ctx.role == Role::Admin {
        return Ok(job);
    }
    if ctx.role == Role::Recruiter {
        if let Some(recruiter) = state.user_service.recruiter_for_user(ctx.user.id).await? {
            if state.job_service.access(recruiter.id, &job.job).await?.is_some() {
                return Ok(job);
            }
        }
    }
    Err(Error::NotFound("Job not found".into()))
}

#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found", body = JobWithCompany),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(visible_job(&state, &ctx, job_id).await?))
}

#[utoipa::path(
    put,
    path = "/jobs/{job_id}",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = Job),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found or not owned")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state
        .job_service
        .update(ctx.recruiter_id(), job_id, payload)
        .await?;
    Ok(Json(job))
}

#[utoipa::path(
    put,
    path = "/jobs/{job_id}/archive",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job hidden from candidates"),
        (status = 404, description = "Job not found or not owned")
    )
)]
pub async fn archive_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .set_active(ctx.recruiter_id(), job_id, false)
        .await?;
    Ok(Json(json!({ "message": "Job archived", "job_id": job.id, "is_active": job.is_active })))
}

#[utoipa::path(
    put,
    path = "/jobs/{job_id}/unarchive",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job visible again"),
        (status = 404, description = "Job not found or not owned")
    )
)]
pub async fn unarchive_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .set_active(ctx.recruiter_id(), job_id, true)
        .await?;
    Ok(Json(json!({ "message": "Job restored", "job_id": job.id, "is_active": job.is_active })))
}

/// Dashboard "delete": the job is archived, applicants are kept.
pub async fn delete_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .set_active(ctx.recruiter_id(), job_id, false)
        .await?;
    Ok(Json(json!({ "message": "Job archived", "job_id": job.id })))
}

#[utoipa::path(
    delete,
    path = "/jobs/{job_id}/permanent",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Job and its applications removed"),
        (status = 404, description = "Job not found or not owned")
    )
)]
pub async fn delete_job_permanently(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .delete_permanently(ctx.recruiter_id(), job_id)
        .await?;
    if let Some(key) = &job.description_file_key {
        if let Err(e) = state.storage.delete(key).await {
            tracing::warn!(%job_id, error = %e, "failed to delete job description file");
        }
    }
    state
        .audit_service
        .record(
            ctx.user.id,
            "job.deleted",
            "job",
            job.id,
            json!({ "title": job.title }),
        )
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_description_file(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::EditJob)
        .await?;
    let file = super::read_file_field(multipart).await?;
    let (ext, content_type) =
        inspect_document(&file.filename, file.content_type.as_deref(), &file.data)?;

    let key = format!("job-descriptions/{}/{}.{}", job.id, Uuid::new_v4(), ext);
    state.storage.put(&key, file.data, content_type).await?;
    let updated = state.job_service.set_description_file(job.id, &key).await?;

    if let Some(old) = job.description_file_key.filter(|old| *old != key) {
        if let Err(e) = state.storage.delete(&old).await {
            tracing::warn!(%job_id, key = %old, error = %e, "failed to delete previous description file");
        }
    }

    let url = presign(&state, &key).await;
    Ok((
        StatusCode::CREATED,
        Json(DescriptionFileResponse {
            job_id: updated.id,
            storage_key: key,
            url,
        }),
    ))
}

pub async fn get_description_file(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = visible_job(&state, &ctx, job_id).await?;
    let key = job
        .job
        .description_file_key
        .ok_or_else(|| Error::NotFound("Job has no description file".into()))?;
    let url = state
        .storage
        .presigned_get_url(&key, Duration::from_secs(DEFAULT_LINK_TTL_SECS as u64))
        .await?;
    Ok(Json(DescriptionFileResponse {
        job_id,
        storage_key: key,
        url: Some(url),
    }))
}

async fn presign(state: &AppState, key: &str) -> Option<String> {
    state
        .storage
        .presigned_get_url(key, Duration::from_secs(DEFAULT_LINK_TTL_SECS as u64))
        .await
        .ok()
}
