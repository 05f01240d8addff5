mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bytes::Bytes;
use recruitment_portal::{
    error::{Error, Result},
    storage::{LocalObjectStore, ObjectStore},
};

async fn primary_ids(app: &axum::Router, token: &str) -> Vec<String> {
    let (status, body) = common::send(app, Method::GET, "/resume/my-resumes", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["resumes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["is_primary"] == true)
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn exactly_one_primary_resume() {
    let app = common::database_app().await;
    let candidate = common::register_candidate(&app, "Pat Primary").await;

    let mut ids = Vec::new();
    for name in ["first.pdf", "second.pdf", "third.pdf"] {
        let (status, body) = common::upload(
            &app,
            "/resume/upload",
            &candidate.token,
            name,
            "application/pdf",
            common::PDF_BYTES,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        ids.push(body["resume_id"].as_str().unwrap().to_string());
    }
    assert_eq!(primary_ids(&app, &candidate.token).await, vec![ids[0].clone()]);

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/resume/set-primary/{}", ids[2]),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary_ids(&app, &candidate.token).await, vec![ids[2].clone()]);

    // deleting the primary promotes the newest remaining resume
    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/resume/delete/{}", ids[2]),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary_ids(&app, &candidate.token).await, vec![ids[1].clone()]);

    let (status, link) = common::send(
        &app,
        Method::GET,
        &format!("/resume/share-link?resume_id={}&expires_in=5", ids[1]),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["expires_in"], 60);
    assert!(link["url"].as_str().unwrap().contains("/files/resumes/"));
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn rejects_unsupported_and_empty_files() {
    let app = common::database_app().await;
    let candidate = common::register_candidate(&app, "Una Upload").await;

    let (status, _) = common::upload(
        &app,
        "/resume/upload",
        &candidate.token,
        "cv.txt",
        "text/plain",
        b"hello",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::upload(
        &app,
        "/resume/upload",
        &candidate.token,
        "cv.pdf",
        "application/pdf",
        b"",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/resume/set-primary/{}", uuid::Uuid::new_v4()),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Local store whose deletes always fail.
struct FailingDeletes(Arc<LocalObjectStore>);

#[async_trait]
impl ObjectStore for FailingDeletes {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        self.0.put(key, body, content_type).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.0.get(key).await
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(Error::Storage("bucket unavailable".into()))
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> Result<String> {
        self.0.presigned_get_url(key, ttl).await
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn resume_row_goes_even_when_the_object_delete_fails() {
    let state = common::database_state(Arc::new(FailingDeletes(common::local_store()))).await;
    let app = common::app_for(state);
    let candidate = common::register_candidate(&app, "Dee Delete").await;

    let mut ids = Vec::new();
    for name in ["old.pdf", "new.pdf"] {
        let (status, body) = common::upload(
            &app,
            "/resume/upload",
            &candidate.token,
            name,
            "application/pdf",
            common::PDF_BYTES,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        ids.push(body["resume_id"].as_str().unwrap().to_string());
    }

    let (status, body) = common::send(
        &app,
        Method::DELETE,
        &format!("/resume/delete/{}", ids[0]),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, listing) =
        common::send(&app, Method::GET, "/resume/my-resumes", Some(&candidate.token), None).await;
    assert_eq!(listing["count"], 1);
    assert_eq!(primary_ids(&app, &candidate.token).await, vec![ids[1].clone()]);
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn rename_sets_and_clears_the_label() {
    let app = common::database_app().await;
    let candidate = common::register_candidate(&app, "Rae Rename").await;
    let other = common::register_candidate(&app, "Oli Other").await;
    let (_, uploaded) = common::upload(
        &app,
        "/resume/upload",
        &candidate.token,
        "cv.pdf",
        "application/pdf",
        common::PDF_BYTES,
    )
    .await;
    let resume_id = uploaded["resume_id"].as_str().unwrap();

    let (status, renamed) = common::send(
        &app,
        Method::PATCH,
        &format!("/resume/rename/{}?name=Backend%20CV%202030", resume_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", renamed);
    assert_eq!(renamed["display_name"], "Backend CV 2030");
    assert_eq!(renamed["original_filename"], "cv.pdf");

    let (status, _) = common::send(
        &app,
        Method::PATCH,
        &format!("/resume/rename/{}?name=Mine", resume_id),
        Some(&other.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, cleared) = common::send(
        &app,
        Method::PATCH,
        &format!("/resume/rename/{}?name=%20", resume_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["display_name"].is_null());
}
