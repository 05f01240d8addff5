use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::application_dto::{ApplyPayload, ApplyResponse, MyApplication, MyApplicationsResponse},
    error::Result,
    middleware::auth::CandidateContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/applications/apply/{job_id}",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = ApplyResponse),
        (status = 400, description = "Answers do not satisfy the job's form"),
        (status = 404, description = "Job or resume not found"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<ApplyPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let questions = state.application_form_service.questions(job_id).await?;
    let application = state
        .application_service
        .apply(
            ctx.candidate_id,
            job_id,
            payload.resume_id,
            &questions,
            &payload.answers,
        )
        .await?;

    let job = state.job_service.get(job_id).await?;
    super::notify_recruiter(
        &state,
        job.recruiter_id,
        "application.received",
        "New application",
        &format!("{} applied for \"{}\"", ctx.user.full_name, job.title),
        json!({ "job_id": job.id, "application_id": application.id }),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: "Application submitted successfully".into(),
            application_id: application.id,
            resume_id: application.resume_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/applications/my",
    responses(
        (status = 200, description = "The candidate's applications, newest first", body = MyApplicationsResponse)
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    ctx: CandidateContext,
) -> Result<impl IntoResponse> {
    let rows = state
        .application_service
        .list_for_candidate(ctx.candidate_id)
        .await?;
    Ok(Json(MyApplicationsResponse {
        applications: rows.into_iter().map(MyApplication::from).collect(),
    }))
}

pub async fn withdraw(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .application_service
        .withdraw(ctx.candidate_id, application_id)
        .await?;
    Ok(Json(json!({
        "message": "Application withdrawn",
        "application_id": application_id
    })))
}
