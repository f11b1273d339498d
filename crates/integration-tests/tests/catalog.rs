//! Health, home page and product pages.

use reqwest::StatusCode;
use serde_json::Value;

use securevision_integration_tests::TestContext;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/health").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
async fn test_home_lists_products_and_empty_navbar() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-frame-options").map(|v| v.as_bytes()),
        Some(&b"DENY"[..])
    );

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["navbar"]["authenticated"], false);
    assert_eq!(body["navbar"]["cart_count"], 0);
    assert_eq!(body["products"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["products"][0]["url"], "/products/1");
}

#[tokio::test]
async fn test_product_listing_prices() {
    let ctx = TestContext::new().await;
    let body: Value = ctx.get("/products").await.json().await.expect("Invalid JSON");

    let prices: Vec<&str> = body
        .as_array()
        .expect("Expected a list")
        .iter()
        .filter_map(|p| p["price"].as_str())
        .collect();
    assert_eq!(prices, ["$199.99", "$149.99", "$299.99"]);
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/products/2").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["name"], "DoorGuard Elite");
    assert_eq!(body["features"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["specs"][1]["label"], "Field of view");
    assert_eq!(body["specs"][1]["value"], "180°");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;

    for path in ["/products/99", "/products/smartcam-pro"] {
        let resp = ctx.get(path).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        let body: Value = resp.json().await.expect("Invalid JSON");
        assert_eq!(body["error"], "Product not found");
    }
}
