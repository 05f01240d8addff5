pub mod analytics_dto;
pub mod application_dto;
pub mod auth_dto;
pub mod interview_dto;
pub mod job_dto;
pub mod notification_dto;
pub mod resume_dto;
pub mod share_dto;
