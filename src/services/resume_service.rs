use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::resume_dto::ShareLinkResponse;
use crate::error::{Error, Result};
use crate::models::resume::Resume;
use crate::storage::SharedObjectStore;

pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_RESUMES_PER_CANDIDATE: i64 = 10;
pub const DEFAULT_LINK_TTL_SECS: i64 = 3600;
pub const MIN_LINK_TTL_SECS: i64 = 60;
pub const MAX_LINK_TTL_SECS: i64 = 7 * 24 * 3600;

const ALLOWED_DOCUMENTS: [(&str, &str); 3] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

/// Checks an uploaded document and returns its extension and content type.
pub fn inspect_document(
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<(&'static str, &'static str)> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| Error::BadRequest("File name must have an extension".into()))?;

    let (ext, expected_type) = ALLOWED_DOCUMENTS
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .copied()
        .ok_or_else(|| {
            Error::BadRequest(format!(
                "File type .{} is not allowed. Upload a PDF, DOC or DOCX file",
                ext
            ))
        })?;

    // browsers sometimes send octet-stream; the extension decides then
    if let Some(ct) = content_type {
        let ct = ct.split(';').next().unwrap_or(ct).trim();
        if ct != "application/octet-stream" && !ALLOWED_DOCUMENTS.iter().any(|(_, t)| *t == ct) {
            return Err(Error::BadRequest(format!(
                "Content type {} is not allowed. Upload a PDF, DOC or DOCX file",
                ct
            )));
        }
    }

    if data.is_empty() {
        return Err(Error::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > MAX_DOCUMENT_BYTES {
        return Err(Error::PayloadTooLarge("File exceeds the 5 MB limit".into()));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    Ok((ext, expected_type))
}

pub fn clamp_link_ttl(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LINK_TTL_SECS)
        .clamp(MIN_LINK_TTL_SECS, MAX_LINK_TTL_SECS)
}

#[derive(Clone)]
pub struct ResumeService {
    pool: PgPool,
    store: SharedObjectStore,
}

impl ResumeService {
    pub fn new(pool: PgPool, store: SharedObjectStore) -> Self {
        Self { pool, store }
    }

    pub async fn upload(
        &self,
        candidate_id: Uuid,
        filename: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<Resume> {
        let (ext, content_type) = inspect_document(filename, content_type, &data)?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resumes WHERE candidate_id = $1")
            .bind(candidate_id)
            .fetch_one(&self.pool)
            .await?;
        if count >= MAX_RESUMES_PER_CANDIDATE {
            return Err(Error::BadRequest(format!(
                "You can keep at most {} resumes; delete one first",
                MAX_RESUMES_PER_CANDIDATE
            )));
        }

        let key = format!("resumes/{}/{}.{}", candidate_id, Uuid::new_v4(), ext);
        let size = data.len() as i64;
        self.store.put(&key, data, content_type).await?;

        let inserted = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (candidate_id, storage_key, original_filename, content_type, file_size, is_primary)
            VALUES ($1, $2, $3, $4, $5,
                    NOT EXISTS (SELECT 1 FROM resumes WHERE candidate_id = $1 AND is_primary))
            RETURNING *
            "#,
        )
        .bind(candidate_id)
        .bind(&key)
        .bind(filename)
        .bind(content_type)
        .bind(size)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(resume) => {
                tracing::info!(resume_id = %resume.id, %candidate_id, size, "resume uploaded");
                Ok(resume)
            }
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&key).await {
                    tracing::warn!(key, error = %cleanup, "failed to remove orphaned upload");
                }
                Err(e.into())
            }
        }
    }

    pub async fn list(&self, candidate_id: Uuid) -> Result<Vec<Resume>> {
        let resumes = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE candidate_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(resumes)
    }

    pub async fn get_owned(&self, candidate_id: Uuid, resume_id: Uuid) -> Result<Resume> {
        sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1 AND candidate_id = $2")
            .bind(resume_id)
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Resume not found or not yours".into()))
    }

    pub async fn share_link(
        &self,
        candidate_id: Uuid,
        resume_id: Option<Uuid>,
        expires_in: Option<i64>,
    ) -> Result<ShareLinkResponse> {
        let resume = match resume_id {
            Some(id) => self.get_owned(candidate_id, id).await?,
            None => sqlx::query_as::<_, Resume>(
                "SELECT * FROM resumes WHERE candidate_id = $1 ORDER BY uploaded_at DESC LIMIT 1",
            )
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("No resume uploaded yet".into()))?,
        };
        let ttl = clamp_link_ttl(expires_in);
        let url = self
            .store
            .presigned_get_url(&resume.storage_key, Duration::from_secs(ttl as u64))
            .await?;
        Ok(ShareLinkResponse {
            resume_id: resume.id,
            url,
            expires_in: ttl,
        })
    }

    /// Link for recruiter views; storage failures only drop the link.
    pub async fn try_presign(&self, storage_key: &str) -> Option<String> {
        let ttl = Duration::from_secs(DEFAULT_LINK_TTL_SECS as u64);
        match self.store.presigned_get_url(storage_key, ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(storage_key, error = %e, "could not presign resume");
                None
            }
        }
    }

    pub async fn set_primary(&self, candidate_id: Uuid, resume_id: Uuid) -> Result<Resume> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM resumes WHERE id = $1 AND candidate_id = $2 FOR UPDATE",
        )
        .bind(resume_id)
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Resume not found or not yours".into()));
        }

        sqlx::query("UPDATE resumes SET is_primary = FALSE WHERE candidate_id = $1 AND is_primary")
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;
        let resume = sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET is_primary = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(resume_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(resume)
    }

    /// Blank names clear the label so the original filename shows again.
    pub async fn rename(&self, candidate_id: Uuid, resume_id: Uuid, name: &str) -> Result<Resume> {
        let name = Some(name.trim()).filter(|n| !n.is_empty());
        sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET display_name = $3 WHERE id = $1 AND candidate_id = $2 RETURNING *",
        )
        .bind(resume_id)
        .bind(candidate_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Resume not found or not yours".into()))
    }

    pub async fn delete(&self, candidate_id: Uuid, resume_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let resume = sqlx::query_as::<_, Resume>(
            "DELETE FROM resumes WHERE id = $1 AND candidate_id = $2 RETURNING *",
        )
        .bind(resume_id)
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Resume not found or not yours".into()))?;
        if resume.is_primary {
            sqlx::query(
                r#"
                UPDATE resumes SET is_primary = TRUE
                WHERE id = (
                    SELECT id FROM resumes WHERE candidate_id = $1
                    ORDER BY uploaded_at DESC LIMIT 1
                )
                "#,
            )
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        // the row is gone already; a stray object is only logged
        if let Err(e) = self.store.delete(&resume.storage_key).await {
            tracing::warn!(%resume_id, key = %resume.storage_key, error = %e, "failed to delete resume object");
        }
        tracing::info!(%resume_id, %candidate_id, "resume deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockObjectStore;
    use std::sync::Arc;

    const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    #[test]
    fn accepts_pdf_doc_docx() {
        assert_eq!(
            inspect_document("cv.PDF", Some("application/pdf"), b"%PDF-1.7").unwrap(),
            ("pdf", "application/pdf")
        );
        assert_eq!(inspect_document("cv.docx", Some(DOCX), b"PK..").unwrap().0, "docx");
        assert_eq!(
            inspect_document("cv.doc", Some("application/octet-stream"), b"\xd0\xcf").unwrap().1,
            "application/msword"
        );
    }

    #[test]
    fn rejects_bad_uploads() {
        assert!(matches!(
            inspect_document("cv", Some("application/pdf"), b"%PDF"),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            inspect_document("cv.png", Some("image/png"), b"\x89PNG"),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            inspect_document("cv.pdf", Some("text/html"), b"%PDF"),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            inspect_document("cv.pdf", Some("application/pdf"), b""),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            inspect_document("cv.pdf", Some("application/pdf"), b"<html>"),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn oversized_upload_is_413() {
        let mut data = b"%PDF".to_vec();
        data.resize(MAX_DOCUMENT_BYTES + 1, b'0');
        assert!(matches!(
            inspect_document("cv.pdf", Some("application/pdf"), &data),
            Err(Error::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn link_ttl_is_clamped() {
        assert_eq!(clamp_link_ttl(None), 3600);
        assert_eq!(clamp_link_ttl(Some(1)), 60);
        assert_eq!(clamp_link_ttl(Some(10_000_000)), 604_800);
        assert_eq!(clamp_link_ttl(Some(900)), 900);
    }

    #[tokio::test]
    async fn presign_failure_only_drops_the_link() {
        let mut store = MockObjectStore::new();
        store
            .expect_presigned_get_url()
            .returning(|_, _| Err(Error::Storage("unreachable".into())));
        let pool = crate::database::pool::create_lazy_pool("postgres://localhost/unused").unwrap();
        let service = ResumeService::new(pool, Arc::new(store));
        assert_eq!(service.try_presign("resumes/a/b.pdf").await, None);
    }
}
