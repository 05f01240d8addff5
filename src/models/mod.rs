pub mod application;
pub mod application_form;
pub mod audit_log;
pub mod interview;
pub mod job;
pub mod notification;
pub mod resume;
pub mod user;
pub mod webhook_log;
