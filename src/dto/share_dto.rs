use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::JobShareDetail;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareJobPayload {
    #[validate(length(min = 1, max = 50))]
    pub recruiter_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareListResponse {
    pub job_id: Uuid,
    pub shared_with: Vec<JobShareDetail>,
}
