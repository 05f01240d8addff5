use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::job::{Job, JobWithCompany};
use crate::utils::validation::{non_negative, ordered_range};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_job"))]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub description_file_key: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_experience: Option<Decimal>,
    pub max_experience: Option<Decimal>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
}

fn check_ranges(
    min_experience: Option<Decimal>,
    max_experience: Option<Decimal>,
    salary_min: Option<Decimal>,
    salary_max: Option<Decimal>,
) -> Result<(), ValidationError> {
    for value in [min_experience, max_experience, salary_min, salary_max] {
        non_negative(value)?;
    }
    ordered_range(min_experience, max_experience)?;
    ordered_range(salary_min, salary_max)
}

fn validate_create_job(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    let has_text = payload
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !has_text && payload.description_file_key.is_none() {
        let mut err = ValidationError::new("description_required");
        err.message = Some("description or description_file_key is required".into());
        return Err(err);
    }
    check_ranges(
        payload.min_experience,
        payload.max_experience,
        payload.salary_min,
        payload.salary_max,
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_job"))]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub min_experience: Option<Decimal>,
    pub max_experience: Option<Decimal>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
}

fn validate_update_job(payload: &UpdateJobPayload) -> Result<(), ValidationError> {
    check_ranges(
        payload.min_experience,
        payload.max_experience,
        payload.salary_min,
        payload.salary_max,
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobWithCompany>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDashboardResponse {
    pub owned_jobs: Vec<Job>,
    pub shared_jobs: Vec<JobWithCompany>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionFileResponse {
    pub job_id: uuid::Uuid,
    pub storage_key: String,
    pub url: Option<String>,
}
