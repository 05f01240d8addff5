mod common;

use axum::http::{Method, StatusCode};
use recruitment_portal::{error::Error, workflow::ApplicationStatus};
use serde_json::json;

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn apply_shortlist_schedule_cancel() {
    let app = common::database_app().await;

    let recruiter = common::register_recruiter(&app, "Rita Recruiter", "Acme Hiring").await;
    let job_id = common::create_job(&app, &recruiter, "Backend Engineer").await;

    let candidate = common::register_candidate(&app, "Cody Candidate").await;
    let (status, resume) = common::upload(
        &app,
        "/resume/upload",
        &candidate.token,
        "cv.pdf",
        "application/pdf",
        common::PDF_BYTES,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", resume);
    assert_eq!(resume["is_primary"], true);
    let resume_id = resume["resume_id"].as_str().unwrap().to_string();

    let (status, applied) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", job_id),
        Some(&candidate.token),
        Some(json!({ "resume_id": resume_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", applied);
    let application_id = applied["application_id"].as_str().unwrap().to_string();

    let (status, mine) =
        common::send(&app, Method::GET, "/applications/my", Some(&candidate.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let apps = mine["applications"].as_array().unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0]["resume_id"], resume_id.as_str());
    assert_eq!(apps[0]["status"], "applied");

    // applying twice is rejected
    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", job_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = common::send(
        &app,
        Method::PUT,
        &format!(
            "/recruiter/applications/{}/status?status=shortlisted",
            application_id
        ),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["status"], "shortlisted");
    assert_eq!(updated["previous_status"], "applied");

    // skipping straight to offered is not a legal move
    let (status, _) = common::send(
        &app,
        Method::PUT,
        &format!("/recruiter/applications/{}/status?status=offered", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, applicant) = common::send(
        &app,
        Method::GET,
        &format!("/recruiter/applications/{}", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applicant["status"], "shortlisted");

    let (status, interviewer) = common::send(
        &app,
        Method::POST,
        "/interviewers",
        Some(&recruiter.token),
        Some(json!({ "name": "Ivan Interviewer", "email": format!("ivan-{}@example.com", recruiter.sub) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", interviewer);

    let at = (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339();
    let (status, scheduled) = common::send(
        &app,
        Method::POST,
        "/interviews/schedule",
        Some(&recruiter.token),
        Some(json!({
            "application_id": application_id,
            "schedule_mode": "direct",
            "interview_type": "online",
            "scheduled_at": at,
            "interviewer_ids": [interviewer["id"]],
            "meeting_link": "https://meet.example.com/abc",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", scheduled);
    assert_eq!(scheduled["state"], "scheduled");

    let (_, mine) =
        common::send(&app, Method::GET, "/applications/my", Some(&candidate.token), None).await;
    assert!(!mine["applications"][0]["scheduled_at"].is_null());
    assert_eq!(mine["applications"][0]["status"], "shortlisted");

    let (status, cancelled) = common::send(
        &app,
        Method::PUT,
        &format!("/interviews/cancel/{}", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", cancelled);

    let (_, mine) =
        common::send(&app, Method::GET, "/applications/my", Some(&candidate.token), None).await;
    assert!(mine["applications"][0]["scheduled_at"].is_null());
    assert_eq!(mine["applications"][0]["interview_state"], "cancelled");
    assert_eq!(mine["applications"][0]["status"], "shortlisted");

    let (status, _) = common::send(
        &app,
        Method::PUT,
        &format!("/interviews/cancel/{}", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, notifications) =
        common::send(&app, Method::GET, "/notifications", Some(&candidate.token), None).await;
    assert!(notifications["unread"].as_i64().unwrap() >= 3);
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn stranger_recruiter_cannot_touch_applicants() {
    let app = common::database_app().await;

    let owner = common::register_recruiter(&app, "Olga Owner", "Owner Co").await;
    let stranger = common::register_recruiter(&app, "Sam Stranger", "Other Co").await;
    let job_id = common::create_job(&app, &owner, "Data Analyst").await;

    let candidate = common::register_candidate(&app, "Cleo Candidate").await;
    common::upload(
        &app,
        "/resume/upload",
        &candidate.token,
        "cv.pdf",
        "application/pdf",
        common::PDF_BYTES,
    )
    .await;
    let (status, applied) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", job_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", applied);
    // falls back to the primary resume
    assert!(!applied["resume_id"].is_null());
    let application_id = applied["application_id"].as_str().unwrap().to_string();

    let (status, _) = common::send(
        &app,
        Method::PUT,
        &format!(
            "/recruiter/applications/{}/status?status=shortlisted",
            application_id
        ),
        Some(&stranger.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::send(
        &app,
        Method::GET,
        &format!("/recruiter/applications/job/{}", job_id),
        Some(&stranger.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/applications/withdraw/{}", application_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) =
        common::send(&app, Method::GET, "/applications/my", Some(&candidate.token), None).await;
    assert!(mine["applications"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn apply_rejects_foreign_resume_and_unknown_job() {
    let app = common::database_app().await;
    let recruiter = common::register_recruiter(&app, "Rae Recruiter", "Acme Hiring").await;
    let job_id = common::create_job(&app, &recruiter, "QA Engineer").await;

    let owner = common::register_candidate(&app, "Olive Owner").await;
    let (_, resume) = common::upload(
        &app,
        "/resume/upload",
        &owner.token,
        "cv.pdf",
        "application/pdf",
        common::PDF_BYTES,
    )
    .await;
    let other = common::register_candidate(&app, "Otto Other").await;

    let (status, body) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", job_id),
        Some(&other.token),
        Some(json!({ "resume_id": resume["resume_id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resume not found or not yours");

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", uuid::Uuid::new_v4()),
        Some(&other.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn status_change_from_a_stale_read_is_rejected() {
    let state = common::database_state(common::local_store()).await;
    let app = common::app_for(state.clone());
    let recruiter = common::register_recruiter(&app, "Stan Stale", "Race Co").await;
    let job_id = common::create_job(&app, &recruiter, "Release Manager").await;
    let (_, application_id) = common::applied_candidate(&app, job_id, "Rory Racer").await;

    let stale = state
        .application_service
        .get(application_id.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(stale.status, "applied");

    let (status, _) = common::send(
        &app,
        Method::PUT,
        &format!(
            "/recruiter/applications/{}/status?status=shortlisted",
            application_id
        ),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // applied -> rejected is legal, but the row is no longer applied
    let result = state
        .application_service
        .update_status(&stale, ApplicationStatus::Rejected)
        .await;
    assert!(matches!(result, Err(Error::Conflict(_))));

    let fresh = state.application_service.get(stale.id).await.unwrap();
    assert_eq!(fresh.status, "shortlisted");
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn assignments_stay_within_the_job_and_its_team() {
    let app = common::database_app().await;
    let owner = common::register_recruiter(&app, "Ada Assigner", "Team Co").await;
    let colleague = common::register_recruiter(&app, "Cal Colleague", "Team Co").await;
    let outsider = common::register_recruiter(&app, "Oz Outsider", "Elsewhere").await;
    let job_a = common::create_job(&app, &owner, "Frontend Engineer").await;
    let job_b = common::create_job(&app, &owner, "Mobile Engineer").await;

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/job-shares/{}/share", job_a),
        Some(&owner.token),
        Some(json!({ "recruiter_ids": [colleague.profile_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (candidate, app_a) = common::applied_candidate(&app, job_a, "Abe Applicant").await;
    let (status, applied_b) = common::send(
        &app,
        Method::POST,
        &format!("/applications/apply/{}", job_b),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let app_b = applied_b["application_id"].as_str().unwrap().to_string();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/recruiter/applications/assign",
        Some(&owner.token),
        Some(json!({
            "job_id": job_a,
            "assignments": [{ "application_id": app_a, "recruiter_id": outsider.profile_id }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/recruiter/applications/assign",
        Some(&owner.token),
        Some(json!({
            "job_id": job_a,
            "assignments": [{ "application_id": app_b, "recruiter_id": colleague.profile_id }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/recruiter/applications/assign",
        Some(&owner.token),
        Some(json!({
            "job_id": job_a,
            "assignments": [{ "application_id": app_a, "recruiter_id": colleague.profile_id }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["assigned"], 1);

    let (_, applicant) = common::send(
        &app,
        Method::GET,
        &format!("/recruiter/applications/{}", app_a),
        Some(&owner.token),
        None,
    )
    .await;
    assert_eq!(
        applicant["assigned_recruiter_id"],
        colleague.profile_id.to_string()
    );

    let (_, notifications) =
        common::send(&app, Method::GET, "/notifications", Some(&colleague.token), None).await;
    assert!(notifications["unread"].as_i64().unwrap() >= 1);
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn application_form_answers_are_checked_and_kept() {
    let app = common::database_app().await;
    let owner = common::register_recruiter(&app, "Fay Form", "Form Co").await;
    let colleague = common::register_recruiter(&app, "Cam Colleague", "Form Co").await;
    let job_id = common::create_job(&app, &owner, "Data Engineer").await;

    let form = json!([
        { "question_text": "Notice period", "field_type": "select",
          "options": ["Immediate", "30 days"], "is_required": true, "order_index": 1 },
        { "question_text": "Why us?", "field_type": "textarea", "order_index": 0 },
    ]);
    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/jobs/{}/application-form", job_id),
        Some(&colleague.token),
        Some(form.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, saved) = common::send(
        &app,
        Method::POST,
        &format!("/jobs/{}/application-form", job_id),
        Some(&owner.token),
        Some(form),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", saved);

    let candidate = common::register_candidate(&app, "Finn Filler").await;
    let (status, fetched) = common::send(
        &app,
        Method::GET,
        &format!("/jobs/{}/application-form", job_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = fetched["questions"].as_array().unwrap();
    assert_eq!(questions[0]["question_text"], "Why us?");
    let notice_id = questions[1]["id"].clone();

    let apply_uri = format!("/applications/apply/{}", job_id);
    let (status, _) =
        common::send(&app, Method::POST, &apply_uri, Some(&candidate.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&candidate.token),
        Some(json!({ "answers": [{ "question_id": notice_id, "answer": "90 days" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, applied) = common::send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&candidate.token),
        Some(json!({ "answers": [{ "question_id": notice_id, "answer": "30 days" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", applied);

    let (_, applicant) = common::send(
        &app,
        Method::GET,
        &format!(
            "/recruiter/applications/{}",
            applied["application_id"].as_str().unwrap()
        ),
        Some(&owner.token),
        None,
    )
    .await;
    assert_eq!(applicant["answers"][0]["question_text"], "Notice period");
    assert_eq!(applicant["answers"][0]["answer"], "30 days");
}
