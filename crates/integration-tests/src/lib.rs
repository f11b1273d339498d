//! Integration tests for the SecureVision storefront.
//!
//! Each test gets a [`TestContext`]: a mock backend and the real storefront
//! router, both listening on ephemeral localhost ports, plus a cookie-aware
//! HTTP client that does not follow redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p securevision-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Health, home page and product pages
//! - `cart` - Cart actions
//! - `checkout` - Checkout guard, snapshot recovery and order submission
//! - `auth` - Login, registration, logout
//! - `enterprise` - Demo requests and video analytics

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};
use url::Url;

use securevision_storefront::{app, config::StorefrontConfig, state::AppState};

/// Password the mock backend accepts for any email.
pub const VALID_PASSWORD: &str = "correct-horse";

/// Email the mock backend reports as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Access token the mock backend issues.
pub const ACCESS_TOKEN: &str = "test-access-token";

/// A video upload as the mock backend received it.
#[derive(Debug, Clone)]
pub struct ReceivedVideo {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Requests recorded by the mock backend, plus failure switches.
#[derive(Debug, Default)]
pub struct MockBackend {
    order_emails: Mutex<Vec<Value>>,
    demo_requests: Mutex<Vec<Value>>,
    registrations: Mutex<Vec<Value>>,
    videos: Mutex<Vec<ReceivedVideo>>,
    fail_order_email: AtomicBool,
    fail_demo_request: AtomicBool,
    order_email_delay: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    /// Bodies of every `send-order-email` call.
    pub fn order_emails(&self) -> Vec<Value> {
        lock(&self.order_emails).clone()
    }

    /// Bodies of every `request-demo` call.
    pub fn demo_requests(&self) -> Vec<Value> {
        lock(&self.demo_requests).clone()
    }

    /// Bodies of every `auth/register` call.
    pub fn registrations(&self) -> Vec<Value> {
        lock(&self.registrations).clone()
    }

    /// Every `analyze-video` upload.
    pub fn videos(&self) -> Vec<ReceivedVideo> {
        lock(&self.videos).clone()
    }

    /// Make `send-order-email` answer 500.
    pub fn fail_order_email(&self, fail: bool) {
        self.fail_order_email.store(fail, Ordering::SeqCst);
    }

    /// Make `request-demo` answer 503.
    pub fn fail_demo_request(&self, fail: bool) {
        self.fail_demo_request.store(fail, Ordering::SeqCst);
    }

    /// Hold every `send-order-email` response for this long.
    pub fn delay_order_email(&self, delay: Duration) {
        *lock(&self.order_email_delay) = Some(delay);
    }
}

async fn send_order_email(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    let delay = *lock(&mock.order_email_delay);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    lock(&mock.order_emails).push(body);
    if mock.fail_order_email.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "SMTP unavailable"})),
        )
            .into_response();
    }
    Json(json!({"message": "Email sent"})).into_response()
}

async fn request_demo(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    lock(&mock.demo_requests).push(body);
    if mock.fail_demo_request.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({"message": "Demo requested"})).into_response()
}

async fn analyze_video(State(mock): State<Arc<MockBackend>>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("video") {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let size = field.bytes().await.map_or(0, |b| b.len());
        lock(&mock.videos).push(ReceivedVideo {
            file_name,
            content_type,
            size,
        });

        return Json(json!({
            "people_count": 4,
            "heatmap": "data:image/png;base64,iVBORw0KGgo=",
            "behaviors": ["High activity detected", "Group gathering"],
            "frames_analyzed": 120
        }))
        .into_response();
    }

    (StatusCode::BAD_REQUEST, Json(json!({"detail": "No video"}))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != VALID_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "user": {"email": email, "name": "Test User"}
    }))
    .into_response()
}

async fn register(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        )
            .into_response();
    }
    lock(&mock.registrations).push(body);
    Json(json!({"message": "User created"})).into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    addr
}

/// A running storefront wired to a mock backend.
pub struct TestContext {
    /// Cookie-aware client; redirects are returned, not followed.
    pub client: Client,
    pub storefront_url: String,
    pub backend: Arc<MockBackend>,
}

impl TestContext {
    /// Start a mock backend and a storefront pointing at it.
    pub async fn new() -> Self {
        let backend = Arc::new(MockBackend::default());
        let backend_router = Router::new()
            .route("/api/send-order-email", post(send_order_email))
            .route("/api/request-demo", post(request_demo))
            .route("/api/analyze-video", post(analyze_video))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .with_state(Arc::clone(&backend));
        let backend_addr = serve(backend_router).await;

        let backend_url =
            Url::parse(&format!("http://{backend_addr}")).expect("Invalid mock backend URL");
        let config = StorefrontConfig::for_backend(backend_url);
        let state = AppState::new(config).expect("Failed to build storefront state");
        let storefront_addr = serve(app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url: format!("http://{storefront_addr}"),
            backend,
        }
    }

    /// Absolute storefront URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a storefront path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a JSON body to a storefront path.
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&self, product_id: i32) -> reqwest::Response {
        self.post_json("/cart/add", &json!({"product_id": product_id}))
            .await
    }

    /// Sign in with the password the mock backend accepts.
    pub async fn login(&self) -> reqwest::Response {
        self.post_json(
            "/auth/login",
            &json!({"email": "ada@example.com", "password": VALID_PASSWORD}),
        )
        .await
    }
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// A checkout form that passes every validation rule.
pub fn valid_checkout_form() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "address": "12 Analytical Way",
        "city": "New York",
        "country": "USA",
        "postalCode": "10001",
        "cardNumber": "4111111111111111",
        "expiry": "12/25",
        "cvc": "123"
    })
}
