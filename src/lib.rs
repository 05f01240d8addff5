pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

use crate::services::{
    analytics_service::AnalyticsService, application_form_service::ApplicationFormService,
    application_service::ApplicationService,
    audit_service::AuditService, interview_service::InterviewService, job_service::JobService,
    notification_service::NotificationService, resume_service::ResumeService,
    share_service::ShareService, user_service::UserService,
};
use crate::storage::SharedObjectStore;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub storage: SharedObjectStore,
    pub user_service: UserService,
    pub job_service: JobService,
    pub share_service: ShareService,
    pub application_service: ApplicationService,
    pub application_form_service: ApplicationFormService,
    pub resume_service: ResumeService,
    pub interview_service: InterviewService,
    pub notification_service: NotificationService,
    pub audit_service: AuditService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(pool: PgPool, storage: SharedObjectStore) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let share_service = ShareService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let application_form_service = ApplicationFormService::new(pool.clone());
        let resume_service = ResumeService::new(pool.clone(), storage.clone());
        let interview_service = InterviewService::new(pool.clone());
        let notification_service = NotificationService::new(
            pool.clone(),
            config.notification_webhook_url.clone(),
            config.webhook_secret.clone(),
        );
        let audit_service = AuditService::new(pool.clone());
        let analytics_service = AnalyticsService::new(pool.clone());

        Self {
            pool,
            storage,
            user_service,
            job_service,
            share_service,
            application_service,
            application_form_service,
            resume_service,
            interview_service,
            notification_service,
            audit_service,
            analytics_service,
        }
    }
}
