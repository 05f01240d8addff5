use axum::{
    extract::Multipart,
    routing::{delete, get, patch, post, put},
    Router,
};
use bytes::Bytes;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::{auth::require_bearer_auth, rate_limit};
use crate::AppState;

pub mod analytics;
pub mod application_forms;
pub mod applications;
pub mod auth;
pub mod docs;
pub mod files;
pub mod health;
pub mod interviewers;
pub mod interviews;
pub mod job_shares;
pub mod jobs;
pub mod notifications;
pub mod recruiter_applications;
pub mod resumes;

/// All routes with per-group rate limits. Outer layers (tracing, CORS, body limit) are added by the binary.
pub fn app(state: AppState, public_rps: u32, api_rps: u32) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/files/*key", get(files::download))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(public_rps),
            rate_limit::rps_middleware,
        ));

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/recruiters", get(auth::list_recruiters))
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/jobs/my", get(jobs::my_jobs))
        .route("/jobs/dashboard", get(jobs::dashboard))
        .route(
            "/jobs/:job_id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/jobs/:job_id/archive", put(jobs::archive_job))
        .route("/jobs/:job_id/unarchive", put(jobs::unarchive_job))
        .route("/jobs/:job_id/permanent", delete(jobs::delete_job_permanently))
        .route(
            "/jobs/:job_id/description-file",
            get(jobs::get_description_file).post(jobs::upload_description_file),
        )
        .route(
            "/jobs/:job_id/application-form",
            get(application_forms::get_form).post(application_forms::save_form),
        )
        .route("/job-shares/:job_id", get(job_shares::list_shares))
        .route("/job-shares/:job_id/share", post(job_shares::share_job))
        .route("/job-shares/:job_id/:recruiter_id", delete(job_shares::revoke_share))
        .route("/applications/apply/:job_id", post(applications::apply))
        .route("/applications/my", get(applications::my_applications))
        .route(
            "/applications/withdraw/:application_id",
            delete(applications::withdraw),
        )
        .route(
            "/recruiter/applications/job/:job_id",
            get(recruiter_applications::list_for_job),
        )
        .route(
            "/recruiter/applications/assign",
            post(recruiter_applications::assign),
        )
        .route(
            "/recruiter/applications/:application_id",
            get(recruiter_applications::get_application),
        )
        .route(
            "/recruiter/applications/:application_id/status",
            put(recruiter_applications::update_status),
        )
        .route("/resume/upload", post(resumes::upload))
        .route("/resume/my-resumes", get(resumes::my_resumes))
        .route("/resume/share-link", get(resumes::share_link))
        .route("/resume/set-primary/:resume_id", post(resumes::set_primary))
        .route("/resume/rename/:resume_id", patch(resumes::rename_resume))
        .route("/resume/delete/:resume_id", delete(resumes::delete_resume))
        .route(
            "/interviewers",
            get(interviewers::list_interviewers).post(interviewers::create_interviewer),
        )
        .route("/interviewers/:id", delete(interviewers::delete_interviewer))
        .route("/interviews/schedule", post(interviews::schedule))
        .route("/interviews/my", get(interviews::my_interviews))
        .route("/interviews/slots/:id", post(interviews::propose_slots))
        .route("/interviews/reschedule/:id", put(interviews::reschedule))
        .route("/interviews/cancel/:id", put(interviews::cancel))
        .route("/interviews/:id", get(interviews::get_interview))
        .route(
            "/interviews/:id/select-slot/:slot_id",
            post(interviews::select_slot),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route(
            "/admin/applications-per-job",
            get(analytics::applications_per_job),
        )
        .route(
            "/admin/recruiter/applications-per-job",
            get(analytics::recruiter_applications_per_job),
        )
        .route(
            "/admin/application-status-summary",
            get(analytics::application_status_summary),
        )
        .route(
            "/admin/upcoming-interviews",
            get(analytics::upcoming_interviews),
        )
        .route("/admin/recent-resumes", get(analytics::recent_resumes))
        .route("/admin/job-performance", get(analytics::job_performance))
        .route(
            "/admin/candidates-needing-action",
            get(analytics::candidates_needing_action),
        )
        .route_layer(axum::middleware::from_fn(require_bearer_auth))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(api_rps),
            rate_limit::rps_middleware,
        ));

    public.merge(api).with_state(state)
}

/// An uploaded file pulled out of a multipart body.
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Reads the `file` field; other fields are ignored.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| Error::BadRequest("Uploaded file must have a name".into()))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }
    Err(Error::BadRequest("Missing 'file' field".into()))
}

pub(crate) async fn notify_candidate(
    state: &AppState,
    candidate_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
    data: JsonValue,
) {
    match state.user_service.user_id_for_candidate(candidate_id).await {
        Ok(Some(user_id)) => {
            state
                .notification_service
                .notify(user_id, kind, title, message, data)
                .await
        }
        Ok(None) => tracing::warn!(%candidate_id, "no user for candidate; notification dropped"),
        Err(e) => tracing::warn!(%candidate_id, error = %e, "failed to resolve candidate"),
    }
}

pub(crate) async fn notify_recruiter(
    state: &AppState,
    recruiter_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
    data: JsonValue,
) {
    match state.user_service.user_id_for_recruiter(recruiter_id).await {
        Ok(Some(user_id)) => {
            state
                .notification_service
                .notify(user_id, kind, title, message, data)
                .await
        }
        Ok(None) => tracing::warn!(%recruiter_id, "no user for recruiter; notification dropped"),
        Err(e) => tracing::warn!(%recruiter_id, error = %e, "failed to resolve recruiter"),
    }
}

/// Outbox notice to every interviewer on the panel.
pub(crate) async fn notify_interviewers(
    state: &AppState,
    interview_id: Uuid,
    event_type: &str,
    data: JsonValue,
) {
    let emails = match state.interview_service.interviewer_emails(interview_id).await {
        Ok(emails) => emails,
        Err(e) => {
            tracing::warn!(%interview_id, error = %e, "failed to load interviewers");
            return;
        }
    };
    if emails.is_empty() {
        return;
    }
    let payload = serde_json::json!({
        "recipients": emails,
        "interview_id": interview_id,
        "data": data,
    });
    state.notification_service.relay(event_type, &payload).await;
}
