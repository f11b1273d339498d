//! HTTP route handlers for the storefront.
//!
//! Every handler answers with JSON or a redirect; per-visitor state lives in
//! the session.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (products + navbar)
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart with total and item count
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line's quantity (1-5)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/checkout          - Checkout guard (snapshot, then checkout or login)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Checkout view (starts a fresh attempt)
//! POST /checkout               - Submit shipping and payment details
//! GET  /checkout/success       - Confirmation of the last order
//!
//! # Auth
//! POST /auth/login             - Sign in (?return_to=/path)
//! POST /auth/register          - Create an account
//! POST /auth/logout            - Sign out
//! GET  /auth/session           - Authentication state and cart badge
//!
//! # Enterprise
//! POST /request-demo           - Demo request
//! POST /video-analytics        - Video upload for analysis (requires auth)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod demo;
pub mod home;
pub mod products;
pub mod video;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/success", get(checkout::success))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session_info))
}

/// Create all routes for the storefront.
///
/// `max_upload_bytes` bounds the video upload body; every other route keeps
/// axum's default limit.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
        .route("/request-demo", post(demo::request_demo))
        .route(
            "/video-analytics",
            post(video::analyze).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
