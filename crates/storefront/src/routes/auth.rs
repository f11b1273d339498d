//! Authentication route handlers.
//!
//! Credentials are checked by the backend; on success the access token and
//! the user it belongs to are kept in the session.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use securevision_core::{safe_return_path, validation::validate_email};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::routes::home::Navbar;
use crate::state::AppState;

/// Where to go after login.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnToQuery {
    pub return_to: Option<String>,
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn require_credentials(email: &str, password: &str) -> Result<()> {
    if !validate_email(email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }
    Ok(())
}

/// Sign in and return to where the visitor came from.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnToQuery>,
    Json(form): Json<LoginRequest>,
) -> Result<Response> {
    let email = form.email.trim();
    require_credentials(email, &form.password)?;
    let password = SecretString::from(form.password);

    let login = state.backend().login(email, &password).await.map_err(|e| {
        tracing::warn!(error = %e, "Login failed");
        AppError::from(e)
    })?;

    set_current_user(&session, &login.access_token, &login.user).await?;
    set_sentry_user(&login.user.email);
    add_breadcrumb("auth", "Signed in", None);
    tracing::info!("Signed in");

    let return_to = safe_return_path(query.return_to.as_deref().unwrap_or("/"));
    Ok(Redirect::to(return_to).into_response())
}

/// Create an account. The visitor signs in separately afterwards.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    let email = form.email.trim();
    require_credentials(email, &form.password)?;
    let password = SecretString::from(form.password);

    state
        .backend()
        .register(name, email, &password)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Registration failed");
            AppError::from(e)
        })?;

    tracing::info!("Account created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created successfully! Please sign in.",
        }),
    )
        .into_response())
}

/// Sign out.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);
    Ok(Redirect::to("/"))
}

/// Authentication state and cart badge for the navbar.
#[instrument(skip_all)]
pub async fn session_info(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Json<Navbar>> {
    Ok(Json(Navbar::for_visitor(user, &session).await?))
}
