use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::application_dto::{ApplicationFormPayload, ApplicationFormResponse},
    error::Result,
    middleware::auth::{RecruiterContext, RequestContext},
    workflow::{form::plan_form, Capability},
    AppState,
};

#[utoipa::path(
    get,
    path = "/jobs/{job_id}/application-form",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Questions in display order; empty when the job has no form", body = ApplicationFormResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = super::jobs::visible_job(&state, &ctx, job_id).await?;
    let questions = state.application_form_service.questions(job.job.id).await?;
    Ok(Json(ApplicationFormResponse {
        job_id: job.job.id,
        questions,
    }))
}

#[utoipa::path(
    post,
    path = "/jobs/{job_id}/application-form",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    request_body = ApplicationFormPayload,
    responses(
        (status = 200, description = "Form replaced", body = ApplicationFormResponse),
        (status = 400, description = "Invalid question"),
        (status = 403, description = "Only the job owner can change the form"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn save_form(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ApplicationFormPayload>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::EditJob)
        .await?;
    let plan = plan_form(&payload)?;
    let questions = state
        .application_form_service
        .replace(job.id, &plan)
        .await?;

    state
        .audit_service
        .record(
            ctx.user.id,
            "job.form_updated",
            "job",
            job.id,
            json!({ "questions": questions.len() }),
        )
        .await;

    Ok(Json(ApplicationFormResponse {
        job_id: job.id,
        questions,
    }))
}
