use axum::Json;
use utoipa::OpenApi;

use super::{
    application_forms, applications, auth, interviews, job_shares, jobs, notifications,
    recruiter_applications, resumes,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::me,
        jobs::create_job,
        jobs::list_jobs,
        jobs::dashboard,
        jobs::get_job,
        jobs::update_job,
        jobs::archive_job,
        jobs::unarchive_job,
        jobs::delete_job_permanently,
        application_forms::get_form,
        application_forms::save_form,
        job_shares::share_job,
        applications::apply,
        applications::my_applications,
        recruiter_applications::list_for_job,
        recruiter_applications::get_application,
        recruiter_applications::update_status,
        recruiter_applications::assign,
        resumes::upload,
        resumes::my_resumes,
        resumes::share_link,
        resumes::set_primary,
        resumes::rename_resume,
        resumes::delete_resume,
        interviews::schedule,
        interviews::propose_slots,
        interviews::reschedule,
        interviews::cancel,
        interviews::get_interview,
        interviews::my_interviews,
        interviews::select_slot,
        notifications::list_notifications,
    ),
    info(title = "Recruitment Portal API")
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_core_workflow_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/applications/apply/{job_id}",
            "/recruiter/applications/{application_id}/status",
            "/interviews/schedule",
            "/interviews/{interview_id}/select-slot/{slot_id}",
            "/interviews/slots/{interview_id}",
            "/interviews/{application_id}",
            "/recruiter/applications/{application_id}",
            "/resume/upload",
            "/resume/rename/{resume_id}",
            "/jobs/{job_id}/archive",
            "/jobs/{job_id}/application-form",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
