use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    config::get_config,
    error::{Error, Result},
    storage::local::verify_download,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub expires: i64,
    pub signature: String,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// Serves signed links issued by the local object store.
#[axum::debug_handler]
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse> {
    if state.storage.backend() != "local" {
        return Err(Error::NotFound("File not found".into()));
    }
    verify_download(
        &get_config().storage.signing_key,
        &key,
        query.expires,
        &query.signature,
    )?;
    let data = state.storage.get(&key).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&key))], data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("resumes/a/b.PDF"), "application/pdf");
        assert_eq!(content_type_for("resumes/a/b.doc"), "application/msword");
        assert_eq!(content_type_for("resumes/a/b"), "application/octet-stream");
    }
}
