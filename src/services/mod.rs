pub mod analytics_service;
pub mod application_form_service;
pub mod application_service;
pub mod audit_service;
pub mod interview_service;
pub mod job_service;
pub mod notification_service;
pub mod resume_service;
pub mod share_service;
pub mod user_service;
