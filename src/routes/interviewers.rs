use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::CreateInterviewerPayload, error::Result,
    middleware::auth::RecruiterContext, AppState,
};

pub async fn list_interviewers(
    State(state): State<AppState>,
    ctx: RecruiterContext,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .interview_service
            .list_interviewers(ctx.recruiter_id())
            .await?,
    ))
}

#[axum::debug_handler]
pub async fn create_interviewer(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Json(payload): Json<CreateInterviewerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interviewer = state
        .interview_service
        .create_interviewer(ctx.recruiter_id(), &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(interviewer)))
}

pub async fn delete_interviewer(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(interviewer_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .interview_service
        .delete_interviewer(ctx.recruiter_id(), interviewer_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
