use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::share_dto::{ShareJobPayload, ShareListResponse},
    error::Result,
    middleware::auth::RecruiterContext,
    workflow::Capability,
    AppState,
};

#[utoipa::path(
    post,
    path = "/job-shares/{job_id}/share",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    request_body = ShareJobPayload,
    responses(
        (status = 200, description = "Current share list", body = ShareListResponse),
        (status = 403, description = "Only the owner can share"),
        (status = 404, description = "Job or recruiter not found")
    )
)]
#[axum::debug_handler]
pub async fn share_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ShareJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::EditJob)
        .await?;
    let outcome = state.share_service.share(&job, &payload.recruiter_ids).await?;

    if !outcome.newly_granted.is_empty() {
        state
            .audit_service
            .record(
                ctx.user.id,
                "job.shared",
                "job",
                job.id,
                json!({ "recruiter_ids": outcome.newly_granted }),
            )
            .await;
    }
    for recruiter_id in &outcome.newly_granted {
        super::notify_recruiter(
            &state,
            *recruiter_id,
            "job.shared",
            "A job was shared with you",
            &format!("{} shared the job \"{}\" with you", ctx.user.full_name, job.title),
            json!({ "job_id": job.id }),
        )
        .await;
    }

    Ok(Json(ShareListResponse {
        job_id: job.id,
        shared_with: outcome.shared_with,
    }))
}

pub async fn list_shares(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::ViewApplicants)
        .await?;
    Ok(Json(ShareListResponse {
        job_id: job.id,
        shared_with: state.share_service.list(job.id).await?,
    }))
}

pub async fn revoke_share(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path((job_id, recruiter_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::EditJob)
        .await?;
    state.share_service.revoke(job.id, recruiter_id).await?;
    state
        .audit_service
        .record(
            ctx.user.id,
            "job.share_revoked",
            "job",
            job.id,
            json!({ "recruiter_id": recruiter_id }),
        )
        .await;
    Ok(Json(json!({ "message": "Share revoked", "job_id": job.id, "recruiter_id": recruiter_id })))
}
