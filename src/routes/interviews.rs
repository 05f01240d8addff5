use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{RescheduleQuery, SchedulePayload, ScheduleResponse, SlotDateQuery},
    error::{Error, Result},
    middleware::auth::{CandidateContext, RecruiterContext, RequestContext, Role},
    models::interview::Interview,
    utils::time,
    workflow::{schedule::SlotInput, Capability},
    AppState,
};

/// Candidate in-app notice plus the interviewer outbox notice.
async fn announce(
    state: &AppState,
    interview: &Interview,
    candidate_id: Uuid,
    event_type: &str,
    title: &str,
    message: &str,
) {
    let data = json!({
        "interview_id": interview.id,
        "application_id": interview.application_id,
        "state": interview.state,
        "scheduled_at": interview.scheduled_at,
        "interview_type": interview.interview_type,
        "meeting_link": interview.meeting_link,
        "location": interview.location,
    });
    super::notify_candidate(state, candidate_id, event_type, title, message, data.clone()).await;
    super::notify_interviewers(state, interview.id, event_type, data).await;
}

#[utoipa::path(
    post,
    path = "/interviews/schedule",
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Interview scheduled", body = ScheduleResponse),
        (status = 400, description = "Invalid schedule"),
        (status = 403, description = "No access to this job"),
        (status = 409, description = "Interview already scheduled")
    )
)]
#[axum::debug_handler]
pub async fn schedule(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Json(payload): Json<SchedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state.application_service.get(payload.application_id).await?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ManageApplicants)
        .await?;

    let interview = state
        .interview_service
        .schedule(ctx.recruiter_id(), &job, application.id, &payload)
        .await?;

    let message = match interview.scheduled_at {
        Some(at) => format!(
            "Your interview for \"{}\" is scheduled at {}",
            job.title,
            at.to_rfc3339()
        ),
        None => format!("Please pick an interview slot for \"{}\"", job.title),
    };
    announce(
        &state,
        &interview,
        application.candidate_id,
        "interview.scheduled",
        "Interview scheduled",
        &message,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse::new("Interview scheduled successfully", &interview)),
    ))
}

/// Offers (or re-offers) slots for an interview still awaiting a choice.
#[utoipa::path(
    post,
    path = "/interviews/slots/{interview_id}",
    params(
        ("interview_id" = Uuid, Path, description = "Interview ID"),
        ("interview_date" = String, Query, description = "Date of the slots, YYYY-MM-DD")
    ),
    request_body = [SlotInput],
    responses(
        (status = 200, description = "Slots replaced"),
        (status = 400, description = "Invalid slots"),
        (status = 403, description = "No access to this job"),
        (status = 409, description = "Interview is not awaiting a slot")
    )
)]
#[axum::debug_handler]
pub async fn propose_slots(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(interview_id): Path<Uuid>,
    Query(query): Query<SlotDateQuery>,
    Json(slots): Json<Vec<SlotInput>>,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.get(interview_id).await?;
    let application = state
        .application_service
        .get(interview.application_id)
        .await?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ManageApplicants)
        .await?;

    let slots = state
        .interview_service
        .propose_slots(&interview, query.interview_date, &slots)
        .await?;

    announce(
        &state,
        &interview,
        application.candidate_id,
        "interview.slots_offered",
        "Interview slots available",
        &format!("New interview slots are available for \"{}\"", job.title),
    )
    .await;

    Ok(Json(json!({
        "message": "Slots saved",
        "interview_id": interview.id,
        "slots": slots
    })))
}

#[utoipa::path(
    put,
    path = "/interviews/reschedule/{application_id}",
    params(
        ("application_id" = Uuid, Path, description = "Application ID"),
        ("new_scheduled_at" = String, Query, description = "RFC 3339 timestamp")
    ),
    responses(
        (status = 200, description = "Interview rescheduled", body = ScheduleResponse),
        (status = 404, description = "No interview for this application"),
        (status = 409, description = "Interview was cancelled")
    )
)]
#[axum::debug_handler]
pub async fn reschedule(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(application_id): Path<Uuid>,
    Query(query): Query<RescheduleQuery>,
) -> Result<impl IntoResponse> {
    let new_scheduled_at = time::from_rfc3339(&query.new_scheduled_at)?;
    let application = state.application_service.get(application_id).await?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ManageApplicants)
        .await?;

    let interview = state
        .interview_service
        .reschedule(application.id, new_scheduled_at)
        .await?;

    announce(
        &state,
        &interview,
        application.candidate_id,
        "interview.rescheduled",
        "Interview rescheduled",
        &format!(
            "Your interview for \"{}\" moved to {}",
            job.title,
            new_scheduled_at.to_rfc3339()
        ),
    )
    .await;

    Ok(Json(ScheduleResponse::new("Interview rescheduled successfully", &interview)))
}

#[utoipa::path(
    put,
    path = "/interviews/cancel/{application_id}",
    params(("application_id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Interview cancelled", body = ScheduleResponse),
        (status = 404, description = "No interview for this application"),
        (status = 409, description = "Interview already cancelled")
    )
)]
#[axum::debug_handler]
pub async fn cancel(
    State(state): State<AppState>,
    ctx: RecruiterContext,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(application_id).await?;
    let job = state
        .job_service
        .authorize(ctx.recruiter_id(), application.job_id, Capability::ManageApplicants)
        .await?;

    let interview = state.interview_service.cancel(application.id).await?;

    announce(
        &state,
        &interview,
        application.candidate_id,
        "interview.cancelled",
        "Interview cancelled",
        &format!("Your interview for \"{}\" was cancelled", job.title),
    )
    .await;

    Ok(Json(ScheduleResponse::new("Interview cancelled", &interview)))
}

/// Interview of an application, for its candidate or a recruiter who can see the job.
#[utoipa::path(
    get,
    path = "/interviews/{application_id}",
    params(("application_id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Interview with interviewers and slots", body = InterviewDetail),
        (status = 403, description = "Not your application or job"),
        (status = 404, description = "No interview for this application")
    )
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(application_id).await?;
    match ctx.role {
        Role::Admin => {}
        Role::Candidate => {
            let profile = state
                .user_service
                .ensure_candidate_profile(ctx.user.id)
                .await?;
            if profile.id != application.candidate_id {
                return Err(Error::Forbidden("Not your application".into()));
            }
        }
        Role::Recruiter => {
            let recruiter = state
                .user_service
                .recruiter_for_user(ctx.user.id)
                .await?
                .ok_or_else(|| Error::Forbidden("Recruiter profile not found".into()))?;
            state
                .job_service
                .authorize(recruiter.id, application.job_id, Capability::ViewApplicants)
                .await?;
        }
    }
    let interview = state
        .interview_service
        .for_application(application.id)
        .await?;
    Ok(Json(state.interview_service.detail(interview).await?))
}

#[utoipa::path(
    get,
    path = "/interviews/my",
    responses(
        (status = 200, description = "The candidate's interviews", body = [CandidateInterview])
    )
)]
#[axum::debug_handler]
pub async fn my_interviews(
    State(state): State<AppState>,
    ctx: CandidateContext,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .interview_service
            .list_for_candidate(ctx.candidate_id)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/interviews/{interview_id}/select-slot/{slot_id}",
    params(
        ("interview_id" = Uuid, Path, description = "Interview ID"),
        ("slot_id" = Uuid, Path, description = "Slot ID")
    ),
    responses(
        (status = 200, description = "Slot confirmed", body = ScheduleResponse),
        (status = 404, description = "Interview or slot not found"),
        (status = 409, description = "A slot was already chosen")
    )
)]
#[axum::debug_handler]
pub async fn select_slot(
    State(state): State<AppState>,
    ctx: CandidateContext,
    Path((interview_id, slot_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let interview = state
        .interview_service
        .select_slot(ctx.candidate_id, interview_id, slot_id)
        .await?;

    let data = json!({
        "interview_id": interview.id,
        "application_id": interview.application_id,
        "scheduled_at": interview.scheduled_at,
    });
    super::notify_recruiter(
        &state,
        interview.scheduled_by,
        "interview.slot_selected",
        "Interview slot selected",
        &format!("{} picked an interview slot", ctx.user.full_name),
        data.clone(),
    )
    .await;
    super::notify_interviewers(&state, interview.id, "interview.slot_selected", data).await;

    Ok(Json(ScheduleResponse::new("Interview slot confirmed", &interview)))
}
