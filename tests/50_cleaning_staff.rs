mod common;

use anyhow::{Context, Result};
use common::{TestApp, DIVISION, OFFICE_A};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn sub_divisional_officers_manage_staff() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let sub = app.signup_sub_divisional("sub", OFFICE_A, DIVISION).await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app
        .post("/cleaning-staff/", &sub, json!({ "name": "Meena", "pincode": OFFICE_A, "contact": "9876543210" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().context("staff has no id")?.to_string();
    let path = format!("/cleaning-staff/{id}/");

    // reads are open to any officer
    let (status, body) = app.get("/cleaning-staff/", &div).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = app.patch(&path, &sub, json!({ "contact": "9000000000" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["contact"], "9000000000");
    assert_eq!(body["data"]["name"], "Meena");

    let (status, _) = app.delete(&path, &sub).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&path, &sub).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cleaning staff not found.");
    Ok(())
}

#[tokio::test]
async fn divisional_officers_cannot_write_staff() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app
        .post("/cleaning-staff/", &div, json!({ "name": "Meena", "pincode": OFFICE_A, "contact": "1" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only sub-divisional officers can add cleaning staff.");
    Ok(())
}

#[tokio::test]
async fn staff_fields_are_required() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let sub = app.signup_sub_divisional("sub", OFFICE_A, DIVISION).await?;

    let (status, body) = app.post("/cleaning-staff/", &sub, json!({ "name": "Meena" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["pincode"], "This field is required.");
    assert_eq!(body["field_errors"]["contact"], "This field is required.");
    Ok(())
}
