mod common;

use anyhow::{Context, Result};
use common::{TestApp, DIVISION, OFFICE_A, OFFICE_B};
use reqwest::StatusCode;
use serde_json::{json, Value};

const EVENTS: &str = "/event-management/event/get_event/";
const REPORTS: &str = "/event-management/event-report/get-reports/";

async fn create_event(app: &TestApp, token: &str, title: &str) -> Result<Value> {
    let (status, body) = app
        .post(
            "/event-management/event/create_event/",
            token,
            json!({
                "title": title,
                "description": "Swachhta drive",
                "location": "Head office",
                "event_date": "2024-12-01",
                "pincode": "999999",
            }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "event creation failed: {status} {body}");
    Ok(body["data"].clone())
}

fn id_of(record: &Value) -> Result<String> {
    record["id"].as_str().map(str::to_string).context("record has no id")
}

#[tokio::test]
async fn events_are_filed_under_the_division() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    app.seed_post_office("120000", None).await?;
    let div = app.signup_divisional("div", DIVISION).await?;
    let other = app.signup_divisional("other", "120000").await?;
    let sub = app.signup_sub_divisional("sub", OFFICE_A, DIVISION).await?;

    let event = create_event(&app, &div, "Drive").await?;
    assert_eq!(event["pincode"], DIVISION);
    create_event(&app, &other, "Elsewhere").await?;

    for token in [&div, &sub] {
        let (status, body) = app.get(EVENTS, token).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Events fetched successfully!");
        let titles: Vec<_> = body["data"]
            .as_array()
            .map(|events| events.iter().filter_map(|e| e["title"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(titles, vec!["Drive"]);
    }
    Ok(())
}

#[tokio::test]
async fn empty_event_list_keeps_its_status() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app.get(EVENTS, &div).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "No events found");

    let app = TestApp::spawn_with(|config| config.api.legacy_empty_status = false).await?;
    app.seed_post_office(DIVISION, None).await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app.get(EVENTS, &div).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn only_the_owning_division_edits_an_event() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    app.seed_post_office("120000", None).await?;
    let div = app.signup_divisional("div", DIVISION).await?;
    let other = app.signup_divisional("other", "120000").await?;
    let sub = app.signup_sub_divisional("sub", OFFICE_A, DIVISION).await?;

    let id = id_of(&create_event(&app, &div, "Drive").await?)?;
    let update = format!("/event-management/event/{id}/update_event/");
    let delete = format!("/event-management/event/{id}/delete_event/");

    let (status, body) = app.patch(&update, &other, json!({ "title": "Hijacked" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to update this Event.");

    let (status, _) = app.delete(&delete, &sub).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&update, &div, json!({ "title": "Renamed", "pincode": "120000" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["pincode"], DIVISION);

    let (status, _) = app.delete(&delete, &div).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.delete(&delete, &div).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found.");
    Ok(())
}

#[tokio::test]
async fn reports_follow_event_and_uploader() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let div = app.signup_divisional("div", DIVISION).await?;
    let sub_a = app.signup_sub_divisional("sub-a", OFFICE_A, DIVISION).await?;
    let sub_b = app.signup_sub_divisional("sub-b", OFFICE_B, DIVISION).await?;

    let event_id = id_of(&create_event(&app, &div, "Drive").await?)?;

    let (status, body) = app
        .post("/event-management/event-report/create-report/", &sub_a, json!({ "name": "No event" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event ID is required.");

    let (status, body) = app
        .post(
            "/event-management/event-report/create-report/",
            &sub_a,
            json!({
                "event_id": event_id,
                "name": "Ravi",
                "report_description": "Collected 40kg",
                "atLocation": true,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event report created successfully.");
    assert_eq!(body["data"]["event"], event_id.as_str());
    assert_eq!(body["data"]["atLocation"], true);
    let report_id = id_of(&body["data"])?;

    let (status, body) = app.get(REPORTS, &div).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event ID is required for divisional users.");

    let (status, body) = app.get(&format!("{REPORTS}?event_id={event_id}"), &div).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = app.get(REPORTS, &sub_b).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reports fetched successfully.");

    // the report carries the division pincode, not either uploader's own
    let update = format!("/event-management/event-report/{report_id}/update-report/");
    let (status, body) = app.patch(&update, &sub_b, json!({ "name": "Someone else" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update reports uploaded by you.");

    let missing = "/event-management/event-report/00000000-0000-0000-0000-000000000000/delete-report/";
    let (status, body) = app.delete(missing, &sub_a).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event report not found.");
    Ok(())
}

#[tokio::test]
async fn divisional_officers_cannot_read_foreign_reports() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    app.seed_post_office("120000", None).await?;
    let div = app.signup_divisional("div", DIVISION).await?;
    let other = app.signup_divisional("other", "120000").await?;

    let event_id = id_of(&create_event(&app, &div, "Drive").await?)?;

    let (status, body) = app.get(&format!("{REPORTS}?event_id={event_id}"), &other).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found or not authorized to access it.");

    let (status, body) = app.get(&format!("{REPORTS}?event_id={event_id}"), &div).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No reports found.");
    Ok(())
}

#[tokio::test]
async fn uploader_edits_and_deletes_reports_of_a_self_divided_office() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.seed_post_office("130000", Some("130000")).await?;
    let div = app.signup_divisional("head", "130000").await?;
    let sub = app.signup_sub_divisional("clerk", "130000", "130000").await?;

    let event = create_event(&app, &div, "Drive").await?;
    let (status, body) = app
        .post(
            "/event-management/event-report/create-report/",
            &sub,
            json!({
                "event_id": id_of(&event)?,
                "name": "Morning shift",
                "date_time": "2024-01-01T00:00:00Z",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let report = body["data"].clone();
    assert_eq!(report["pincode"], "130000");
    let report_id = id_of(&report)?;

    let update = format!("/event-management/event-report/{report_id}/update-report/");
    let (status, body) = app.patch(&update, &sub, json!({ "name": "Evening shift" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event report updated successfully.");
    assert_eq!(body["data"]["name"], "Evening shift");
    assert_ne!(body["data"]["date_time"], report["date_time"]);

    let (status, body) = app.get(REPORTS, &sub).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Evening shift");

    let delete = format!("/event-management/event-report/{report_id}/delete-report/");
    let (status, _) = app.delete(&delete, &sub).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.delete(&delete, &sub).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event report not found.");
    Ok(())
}
