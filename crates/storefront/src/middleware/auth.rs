//! Authentication extractors and session helpers.
//!
//! A visitor is authenticated when the session holds both the backend access
//! token and the user it was issued for. Login writes both, logout removes
//! both.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;
use url::form_urlencoded;

use securevision_core::safe_return_path;

use crate::models::{CurrentUser, session_keys};

/// Path of the login endpoint unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Login URL that brings the visitor back to `return_to` afterwards.
#[must_use]
pub fn login_redirect_url(return_to: &str) -> String {
    let target: String =
        form_urlencoded::byte_serialize(safe_return_path(return_to).as_bytes()).collect();
    format!("{LOGIN_PATH}?return_to={target}")
}

/// Extractor that requires a signed-in visitor.
///
/// If nobody is signed in, redirects to the login page with the current
/// path as the return target.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the visitor is not signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, then back to the given path.
    RedirectToLogin { return_to: String },
    /// No session layer in front of the handler.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { return_to } => {
                Redirect::to(&login_redirect_url(&return_to)).into_response()
            }
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        current_user(session)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::RedirectToLogin {
                return_to: request_path(parts).to_string(),
            })
    }
}

/// Path as the visitor requested it; nested routers strip their prefix from `parts.uri`.
fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |OriginalUri(uri)| uri.path())
}

/// Extractor that optionally gets the signed-in visitor.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// The signed-in user, if the session holds both a token and a user.
async fn current_user(session: &Session) -> Option<CurrentUser> {
    let token: Option<String> = session.get(session_keys::ACCESS_TOKEN).await.ok().flatten();
    if token.is_none_or(|t| t.is_empty()) {
        return None;
    }

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the access token and user in the session (login).
///
/// The session id is cycled first so a pre-login session id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    access_token: &SecretString,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::ACCESS_TOKEN, access_token.expose_secret())
        .await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the access token and user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::ACCESS_TOKEN).await?;
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn ada() -> CurrentUser {
        CurrentUser {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    #[test]
    fn test_request_path_prefers_original_uri() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_path(&parts), "/");

        parts
            .extensions
            .insert(OriginalUri("/checkout?step=pay".parse().unwrap()));
        assert_eq!(request_path(&parts), "/checkout");
    }

    #[test]
    fn test_login_redirect_url_encodes_return_to() {
        assert_eq!(login_redirect_url("/cart"), "/auth/login?return_to=%2Fcart");
        assert_eq!(
            login_redirect_url("https://evil.example.com"),
            "/auth/login?return_to=%2F"
        );
    }

    #[tokio::test]
    async fn test_set_and_clear_current_user() {
        let session = session();
        assert!(current_user(&session).await.is_none());

        set_current_user(&session, &SecretString::from("tok"), &ada())
            .await
            .unwrap();
        assert_eq!(current_user(&session).await, Some(ada()));

        clear_current_user(&session).await.unwrap();
        assert!(current_user(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_user_without_token_is_not_authenticated() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, ada())
            .await
            .unwrap();
        assert!(current_user(&session).await.is_none());
    }
}
