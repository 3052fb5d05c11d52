mod common;

use anyhow::Result;
use common::{TestApp, DIVISION, OFFICE_A, OFFICE_B};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn divisional_officer_manages_post_offices() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app
        .post(
            "/postoffice/",
            &div,
            json!({
                "pincode": "110003",
                "name": "Karol Bagh",
                "contactNo": "01125730000",
                "address": "Pusa Road",
                "division_pincode": DIVISION,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["contactNo"], "01125730000");

    let (status, _) = app
        .post(
            "/postoffice/",
            &div,
            json!({ "pincode": "110003", "name": "x", "contactNo": "1", "address": "y" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.patch("/postoffice/110003/", &div, json!({ "name": "Karol Bagh HO" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Karol Bagh HO");
    assert_eq!(body["data"]["address"], "Pusa Road");

    let (status, body) = app.get("/postoffice/by_division/", &div).await?;
    assert_eq!(status, StatusCode::OK);
    let pincodes: Vec<_> = body["data"]
        .as_array()
        .map(|offices| offices.iter().filter_map(|o| o["pincode"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(pincodes, vec![OFFICE_A, OFFICE_B, "110003"]);

    let (status, _) = app.delete("/postoffice/110003/", &div).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get("/postoffice/110003/", &div).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post office not found.");
    Ok(())
}

#[tokio::test]
async fn post_office_input_is_validated() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let div = app.signup_divisional("div", DIVISION).await?;

    let (status, body) = app
        .post(
            "/postoffice/",
            &div,
            json!({
                "pincode": "12345678901",
                "name": "Too long",
                "contactNo": "011",
                "division_pincode": "999999",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["pincode"].is_string());
    assert!(body["field_errors"]["address"].is_string());
    assert!(body["field_errors"]["division_pincode"].is_string());
    Ok(())
}

#[tokio::test]
async fn sub_divisional_officers_cannot_touch_post_offices() -> Result<()> {
    let app = TestApp::with_hierarchy().await?;
    let sub = app.signup_sub_divisional("sub", OFFICE_A, DIVISION).await?;

    let (status, body) = app.get("/postoffice/", &sub).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to perform this action.");

    let (status, _) = app.get("/postoffice/by_division/", &sub).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
