pub mod access;
pub mod form;
pub mod schedule;
pub mod status;

pub use access::{Capability, JobAccess};
pub use schedule::{InterviewState, InterviewType, ScheduleMode};
pub use status::ApplicationStatus;
