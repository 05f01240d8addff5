use uuid::Uuid;

use crate::error::{Error, Result};

/// How a recruiter relates to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAccess {
    Owner,
    Shared,
}

/// Things a recruiter may want to do with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// List applicants and read their applications.
    ViewApplicants,
    /// Change status, assign, schedule interviews.
    ManageApplicants,
    /// Edit, archive, delete or share the job itself.
    EditJob,
}

impl JobAccess {
    pub fn resolve(recruiter_id: Uuid, owner_id: Uuid, shared_with: &[Uuid]) -> Option<Self> {
        if recruiter_id == owner_id {
            Some(JobAccess::Owner)
        } else if shared_with.contains(&recruiter_id) {
            Some(JobAccess::Shared)
        } else {
            None
        }
    }

    pub fn permits(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewApplicants | Capability::ManageApplicants => true,
            Capability::EditJob => matches!(self, JobAccess::Owner),
        }
    }
}

pub fn ensure(access: Option<JobAccess>, capability: Capability) -> Result<JobAccess> {
    match access {
        Some(access) if access.permits(capability) => Ok(access),
        Some(JobAccess::Shared) => Err(Error::Forbidden(
            "Only the job owner can perform this action".into(),
        )),
        _ => Err(Error::Forbidden(match capability {
            Capability::ViewApplicants => "Not allowed to view applicants for this job".into(),
            Capability::ManageApplicants => "Not allowed to update this application".into(),
            Capability::EditJob => "Not allowed to modify this job".into(),
        })),
    }
}
