use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recruiter-visible lifecycle of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Interview,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        raw.parse()
    }

    /// Statuses reachable from `self` in one step, excluding `self`.
    pub fn allowed_next(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Shortlisted, Rejected],
            Shortlisted => &[Applied, Interview, Rejected],
            Interview => &[Shortlisted, Offered, Rejected],
            Offered => &[Interview, Rejected],
            Rejected => &[Applied, Shortlisted],
        }
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        *self == next || self.allowed_next().contains(&next)
    }

    /// Statuses for which the dashboard offers interview scheduling.
    pub fn allows_interview_actions(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Shortlisted | ApplicationStatus::Interview
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                Error::BadRequest(format!(
                    "Invalid status '{}'. Expected one of: applied, shortlisted, interview, offered, rejected",
                    s.trim()
                ))
            })
    }
}

/// Outcome of checking a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

pub fn plan_transition(current: ApplicationStatus, requested: ApplicationStatus) -> Result<Transition> {
    if current == requested {
        return Ok(Transition::Unchanged);
    }
    if !current.can_transition_to(requested) {
        let allowed = current
            .allowed_next()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::Conflict(format!(
            "Cannot move application from '{}' to '{}' (allowed: {})",
            current, requested, allowed
        )));
    }
    Ok(Transition::Changed {
        from: current,
        to: requested,
    })
}
