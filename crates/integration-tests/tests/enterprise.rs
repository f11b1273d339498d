//! Demo requests and video analytics.

use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde_json::{Value, json};

use securevision_integration_tests::{TestContext, location};

fn demo_form() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@acme.example",
        "company": "Acme Retail",
        "phone": "+1 555 0100",
        "employees": "51-200",
        "message": "Twelve stores"
    })
}

fn video_form(bytes: Vec<u8>) -> Form {
    let part = Part::bytes(bytes)
        .file_name("lobby.mp4")
        .mime_str("video/mp4")
        .expect("Invalid MIME type");
    Form::new().part("video", part)
}

// ============================================================================
// Demo Requests
// ============================================================================

#[tokio::test]
async fn test_demo_request_forwarded() {
    let ctx = TestContext::new().await;

    let resp = ctx.post_json("/request-demo", &demo_form()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("24 hours")));

    assert_eq!(ctx.backend.demo_requests(), vec![demo_form()]);
}

#[tokio::test]
async fn test_demo_request_validation() {
    let ctx = TestContext::new().await;

    let mut form = demo_form();
    form["email"] = json!("ada@acme");
    form["employees"] = json!("a lot");
    let resp = ctx.post_json("/request-demo", &form).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(
        body["fields"],
        json!({
            "email": "Please enter a valid business email",
            "employees": "Please select the number of employees"
        })
    );
    assert!(ctx.backend.demo_requests().is_empty());
}

#[tokio::test]
async fn test_demo_request_backend_failure() {
    let ctx = TestContext::new().await;
    ctx.backend.fail_demo_request(true);

    let resp = ctx.post_json("/request-demo", &demo_form()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    // Single attempt, no retry.
    assert_eq!(ctx.backend.demo_requests().len(), 1);
}

// ============================================================================
// Video Analytics
// ============================================================================

#[tokio::test]
async fn test_video_upload_requires_login() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/video-analytics"))
        .multipart(video_form(vec![0_u8; 64]))
        .send()
        .await
        .expect("POST request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login?return_to=%2Fvideo-analytics");
    assert!(ctx.backend.videos().is_empty());
}

#[tokio::test]
async fn test_video_analysis_returned_verbatim() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    let resp = ctx
        .client
        .post(ctx.url("/video-analytics"))
        .multipart(video_form(vec![7_u8; 2048]))
        .send()
        .await
        .expect("POST request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(
        body,
        json!({
            "people_count": 4,
            "heatmap": "data:image/png;base64,iVBORw0KGgo=",
            "behaviors": ["High activity detected", "Group gathering"],
            "frames_analyzed": 120
        })
    );

    let videos = ctx.backend.videos();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].size, 2048);
    assert_eq!(videos[0].file_name.as_deref(), Some("lobby.mp4"));
    assert_eq!(videos[0].content_type.as_deref(), Some("video/mp4"));
}

#[tokio::test]
async fn test_video_upload_without_file() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    let resp = ctx
        .client
        .post(ctx.url("/video-analytics"))
        .multipart(Form::new().text("note", "no video here"))
        .send()
        .await
        .expect("POST request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ctx
        .client
        .post(ctx.url("/video-analytics"))
        .multipart(video_form(Vec::new()))
        .send()
        .await
        .expect("POST request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.backend.videos().is_empty());
}
