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
    dto::resume_dto::{RenameQuery, ResumeListResponse, ShareLinkQuery, UploadResumeResponse},
    error::Result,
    middleware::auth::CandidateContext,
    AppState,
};

/// Multipart upload; the document is sniffed before it reaches storage.
#[utoipa::path(
    post,
    path = "/resume/upload",
    responses(
        (status = 201, description = "Resume stored", body = UploadResumeResponse),
        (status = 400, description = "Not a PDF, DOC or DOCX file"),
        (status = 413, description = "File too large")
    )
)]
#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    ctx: CandidateContext,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let file = super::read_file_field(multipart).await?;
    let resume = state
        .resume_service
        .upload(
            ctx.candidate_id,
            &file.filename,
            file.content_type.as_deref(),
            file.data,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(UploadResumeResponse::from(resume))))
}

#[utoipa::path(
    get,
    path = "/resume/my-resumes",
    responses(
        (status = 200, description = "The candidate's resumes, newest first", body = ResumeListResponse)
    )
)]
pub async fn my_resumes(
    State(state): State<AppState>,
    ctx: CandidateContext,
) -> Result<impl IntoResponse> {
    let resumes = state.resume_service.list(ctx.candidate_id).await?;
    Ok(Json(ResumeListResponse {
        count: resumes.len(),
        resumes,
    }))
}

#[utoipa::path(
    get,
    path = "/resume/share-link",
    params(
        ("resume_id" = Option<Uuid>, Query, description = "Defaults to the newest resume"),
        ("expires_in" = Option<i64>, Query, description = "Seconds, 60 to 604800")
    ),
    responses(
        (status = 200, description = "Presigned download URL", body = ShareLinkResponse),
        (status = 404, description = "No resume")
    )
)]
pub async fn share_link(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Query(query): Query<ShareLinkQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .resume_service
            .share_link(ctx.candidate_id, query.resume_id, query.expires_in)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/resume/set-primary/{resume_id}",
    params(("resume_id" = Uuid, Path, description = "Resume ID")),
    responses(
        (status = 200, description = "Primary resume updated"),
        (status = 404, description = "Resume not found or not yours")
    )
)]
pub async fn set_primary(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path(resume_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let resume = state
        .resume_service
        .set_primary(ctx.candidate_id, resume_id)
        .await?;
    Ok(Json(json!({
        "message": "Primary resume updated",
        "resume_id": resume.id,
        "is_primary": resume.is_primary
    })))
}

#[utoipa::path(
    patch,
    path = "/resume/rename/{resume_id}",
    params(
        ("resume_id" = Uuid, Path, description = "Resume ID"),
        ("name" = String, Query, description = "New label; blank clears it")
    ),
    responses(
        (status = 200, description = "Resume renamed", body = Resume),
        (status = 400, description = "Name too long"),
        (status = 404, description = "Resume not found or not yours")
    )
)]
pub async fn rename_resume(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path(resume_id): Path<Uuid>,
    Query(query): Query<RenameQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let resume = state
        .resume_service
        .rename(ctx.candidate_id, resume_id, &query.name)
        .await?;
    Ok(Json(resume))
}

#[utoipa::path(
    delete,
    path = "/resume/delete/{resume_id}",
    params(("resume_id" = Uuid, Path, description = "Resume ID")),
    responses(
        (status = 200, description = "Resume deleted; the newest remaining one becomes primary"),
        (status = 404, description = "Resume not found or not yours")
    )
)]
pub async fn delete_resume(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path(resume_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .resume_service
        .delete(ctx.candidate_id, resume_id)
        .await?;
    Ok(Json(json!({ "message": "Resume deleted", "resume_id": resume_id })))
}
