mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};

fn at(date: NaiveDate, clock: &str) -> DateTime<Utc> {
    let time = NaiveTime::parse_from_str(clock, "%H:%M").unwrap();
    Utc.from_utc_datetime(&date.and_time(time))
}

fn parse_time(value: &JsonValue) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

async fn schedule_slots(
    app: &axum::Router,
    recruiter: &common::TestUser,
    application_id: &str,
    interviewer: &JsonValue,
    date: NaiveDate,
) -> JsonValue {
    let (status, body) = common::send(
        app,
        Method::POST,
        "/interviews/schedule",
        Some(&recruiter.token),
        Some(json!({
            "application_id": application_id,
            "schedule_mode": "slots",
            "interview_type": "phone",
            "interviewer_ids": [interviewer],
            "interview_date": date.to_string(),
            "slots": [
                { "start_time": "10:00", "end_time": "11:00" },
                { "start_time": "14:00", "end_time": "15:00" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["state"], "awaiting_slot");
    assert!(body["scheduled_at"].is_null());
    body
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn picked_slot_fixes_the_interview_time_once() {
    let app = common::database_app().await;
    let recruiter = common::register_recruiter(&app, "Sol Slots", "Slot Co").await;
    let job_id = common::create_job(&app, &recruiter, "SRE").await;
    let interviewer = common::create_interviewer(&app, &recruiter).await;
    let (candidate, application_id) = common::applied_candidate(&app, job_id, "Pia Picker").await;

    let date = Utc::now().date_naive() + Duration::days(3);
    let scheduled = schedule_slots(&app, &recruiter, &application_id, &interviewer, date).await;
    let interview_id = scheduled["interview_id"].as_str().unwrap().to_string();

    let (status, detail) = common::send(
        &app,
        Method::GET,
        &format!("/interviews/{}", application_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["slots"].as_array().unwrap().len(), 2);

    // re-offering replaces the slots still on the table
    let (status, offered) = common::send(
        &app,
        Method::POST,
        &format!("/interviews/slots/{}?interview_date={}", interview_id, date),
        Some(&recruiter.token),
        Some(json!([{ "start_time": "09:00", "end_time": "09:30" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", offered);
    let slots = offered["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    let slot_id = slots[0]["id"].as_str().unwrap().to_string();

    let (status, picked) = common::send(
        &app,
        Method::POST,
        &format!("/interviews/{}/select-slot/{}", interview_id, slot_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", picked);
    assert_eq!(picked["state"], "scheduled");
    assert_eq!(parse_time(&picked["scheduled_at"]), at(date, "09:00"));

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/interviews/{}/select-slot/{}", interview_id, slot_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // slots can no longer be offered once a time is fixed
    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/interviews/slots/{}?interview_date={}", interview_id, date),
        Some(&recruiter.token),
        Some(json!([{ "start_time": "16:00", "end_time": "16:30" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) =
        common::send(&app, Method::GET, "/applications/my", Some(&candidate.token), None).await;
    assert_eq!(parse_time(&mine["applications"][0]["scheduled_at"]), at(date, "09:00"));
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn another_candidate_cannot_pick_a_slot() {
    let app = common::database_app().await;
    let recruiter = common::register_recruiter(&app, "Sol Slots", "Slot Co").await;
    let job_id = common::create_job(&app, &recruiter, "DBA").await;
    let interviewer = common::create_interviewer(&app, &recruiter).await;
    let (_, application_id) = common::applied_candidate(&app, job_id, "Pia Picker").await;
    let intruder = common::register_candidate(&app, "Ian Intruder").await;

    let date = Utc::now().date_naive() + Duration::days(2);
    let scheduled = schedule_slots(&app, &recruiter, &application_id, &interviewer, date).await;
    let interview_id = scheduled["interview_id"].as_str().unwrap();

    let (_, detail) = common::send(
        &app,
        Method::GET,
        &format!("/interviews/{}", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    let slot_id = detail["slots"][0]["id"].as_str().unwrap();

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/interviews/{}/select-slot/{}", interview_id, slot_id),
        Some(&intruder.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn reschedule_moves_the_time_until_cancelled() {
    let app = common::database_app().await;
    let recruiter = common::register_recruiter(&app, "Remy Reschedule", "Move Co").await;
    let job_id = common::create_job(&app, &recruiter, "Support Engineer").await;
    let interviewer = common::create_interviewer(&app, &recruiter).await;
    let (candidate, application_id) = common::applied_candidate(&app, job_id, "Nia Newtime").await;

    let date = Utc::now().date_naive() + Duration::days(5);
    let new_time = at(date, "15:00");
    let reschedule_uri = format!(
        "/interviews/reschedule/{}?new_scheduled_at={}",
        application_id,
        new_time.format("%Y-%m-%dT%H:%M:%SZ")
    );

    let (status, _) =
        common::send(&app, Method::PUT, &reschedule_uri, Some(&recruiter.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    schedule_slots(&app, &recruiter, &application_id, &interviewer, date).await;

    let (status, moved) =
        common::send(&app, Method::PUT, &reschedule_uri, Some(&recruiter.token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", moved);
    assert_eq!(moved["state"], "rescheduled");
    assert_eq!(parse_time(&moved["scheduled_at"]), new_time);

    // the fixed time replaces the slots that were on offer
    let (_, detail) = common::send(
        &app,
        Method::GET,
        &format!("/interviews/{}", application_id),
        Some(&candidate.token),
        None,
    )
    .await;
    assert!(detail["slots"].as_array().unwrap().is_empty());
    assert_eq!(parse_time(&detail["scheduled_at"]), new_time);

    let past = format!(
        "/interviews/reschedule/{}?new_scheduled_at={}",
        application_id,
        (Utc::now() - Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ")
    );
    let (status, _) = common::send(&app, Method::PUT, &past, Some(&recruiter.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        Method::PUT,
        &format!("/interviews/cancel/{}", application_id),
        Some(&recruiter.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        common::send(&app, Method::PUT, &reschedule_uri, Some(&recruiter.token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
