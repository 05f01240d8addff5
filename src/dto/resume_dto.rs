use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::resume::Resume;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResumeResponse {
    pub message: String,
    pub resume_id: Uuid,
    pub storage_key: String,
    pub filename: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub is_primary: bool,
}

impl From<Resume> for UploadResumeResponse {
    fn from(resume: Resume) -> Self {
        Self {
            message: "Resume uploaded successfully".into(),
            resume_id: resume.id,
            storage_key: resume.storage_key,
            filename: resume.original_filename,
            size_bytes: resume.file_size,
            content_type: resume.content_type,
            is_primary: resume.is_primary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeListResponse {
    pub count: usize,
    pub resumes: Vec<Resume>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameQuery {
    #[validate(length(max = 200))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareLinkQuery {
    pub resume_id: Option<Uuid>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    pub resume_id: Uuid,
    pub url: String,
    pub expires_in: i64,
}
