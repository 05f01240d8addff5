use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicantDetail, ApplicantView, AssignPayload, AssignResponse, JobApplicantsResponse,
        StatusQuery, StatusUpdateResponse,
    },
    error::Result,
    middleware::auth::RecruiterContext,
    models::application::ApplicantRow,
    workflow::status::Transition,
    workflow::{ApplicationStatus, Capability},
    AppState,
};

async fn view(state: &AppState, row: ApplicantRow) -> ApplicantView {
    let url = match &row.resume_storage_key {
        Some(key) => state.resume_service.try_presign(key).await,
        None => None,
    };
    ApplicantView::from_row(row, url)
}

#[utoipa::path(
    get,
    path = "/recruiter/applications/job/{job_id}",
    params(("job_id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applicants for the job", body = JobApplicantsResponse),
        (status = 403, description = "No access to this job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn list_for_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), job_id, Capability::ViewApplicants)
        .await?;
    let rows = state.application_service.list_for_job(job.id).await?;
    let mut applications = Vec::with_capacity(rows.len());
    for row in rows {
        applications.push(view(&state, row).await);
    }
    Ok(Json(JobApplicantsResponse {
        job_id: job.id,
        job_title: job.title,
        count: applications.len(),
        applications,
    }))
}

#[utoipa::path(
    get,
    path = "/recruiter/applications/{application_id}",
    params(("application_id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Applicant with form answers", body = ApplicantDetail),
        (status = 403, description = "No access to this job"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(application_id).await?;
    state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ViewApplicants)
        .await?;
    let row = state.application_service.get_applicant(application.id).await?;
    let answers = state.application_form_service.answers(application.id).await?;
    Ok(Json(ApplicantDetail {
        applicant: view(&state, row).await,
        answers,
    }))
}

#[utoipa::path(
    put,
    path = "/recruiter/applications/{application_id}/status",
    params(
        ("application_id" = Uuid, Path, description = "Application ID"),
        ("status" = String, Query, description = "applied, shortlisted, interview, offered or rejected")
    ),
    responses(
        (status = 200, description = "Status updated", body = StatusUpdateResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "No access to this job"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(application_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(application_id).await?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ManageApplicants)
        .await?;
    let requested = ApplicationStatus::parse(&query.status)?;

    let transition = state
        .application_service
        .update_status(&application, requested)
        .await?;

    let message = match transition {
        Transition::Unchanged => "Status unchanged",
        Transition::Changed { from, to } => {
            state
                .audit_service
                .record(
                    ctx.user.id,
                    "application.status_changed",
                    "application",
                    application.id,
                    json!({ "from": from, "to": to }),
                )
                .await;
            super::notify_candidate(
                &state,
                application.candidate_id,
                "application.status_changed",
                "Application update",
                &format!("Your application for \"{}\" is now {}", job.title, to),
                json!({ "application_id": application.id, "job_id": job.id, "status": to }),
            )
            .await;
            "Status updated successfully"
        }
    };

    Ok(Json(StatusUpdateResponse {
        message: message.into(),
        application_id: application.id,
        status: requested.as_str().into(),
        previous_status: application.status,
    }))
}

#[utoipa::path(
    post,
    path = "/recruiter/applications/assign",
    request_body = AssignPayload,
    responses(
        (status = 200, description = "Applications assigned", body = AssignResponse),
        (status = 400, description = "Application not in job or assignee without access"),
        (status = 403, description = "No access to this job")
    )
)]
#[axum::debug_handler]
pub async fn assign(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Json(payload): Json<AssignPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), payload.job_id, Capability::ManageApplicants)
        .await?;
    let shared_with = state.share_service.shared_recruiter_ids(job.id).await?;
    let assigned = state
        .application_service
        .assign(&job, &shared_with, &payload.assignments)
        .await?;

    for assignment in &payload.assignments {
        state
            .audit_service
            .record(
                ctx.user.id,
                "application.assigned",
                "application",
                assignment.application_id,
                json!({ "recruiter_id": assignment.recruiter_id }),
            )
            .await;
    }

    let mut assignees: Vec<Uuid> = payload
        .assignments
        .iter()
        .map(|a| a.recruiter_id)
        .filter(|id| *id != ctx.recruiter_id())
        .collect();
    assignees.sort();
    assignees.dedup();
    for recruiter_id in assignees {
        super::notify_recruiter(
            &state,
            recruiter_id,
            "application.assigned",
            "Applications assigned to you",
            &format!("You were assigned applicants for \"{}\"", job.title),
            json!({ "job_id": job.id }),
        )
        .await;
    }

    Ok(Json(AssignResponse {
        message: "Applications assigned".into(),
        job_id: job.id,
        assigned,
    }))
}
