//! Checkout route handlers.
//!
//! The checkout phase of the current attempt is kept in the session. A
//! submission that finds the phase already `Submitting` is a duplicate and
//! is rejected with 409. Opening the checkout view starts a fresh attempt
//! unless one is still in flight.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use securevision_core::{
    Cart, CheckoutEvent, CheckoutForm, CheckoutPhase, Email, OrderEmailRequest,
    SnapshotRepository, recover_cart,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{OrderConfirmation, PhaseRecord, session_keys};
use crate::routes::cart::{CartView, load_cart, save_cart};
use crate::services::SessionSnapshotStore;
use crate::state::AppState;

/// Checkout view data.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub cart: CartView,
    pub phase: CheckoutPhase,
    /// Pre-fill for the email field.
    pub email: String,
}

/// Confirmation view data.
#[derive(Debug, Serialize)]
pub struct CheckoutSuccessView {
    pub message: &'static str,
    pub order: OrderConfirmation,
}

const ORDER_PLACED_MESSAGE: &str =
    "Your order has been successfully placed. You will receive a confirmation email shortly.";

/// Current phase. An in-flight phase outliving the backend timeout was
/// abandoned and reads as `Editing`.
async fn load_phase(session: &Session, stale_after: Duration) -> Result<CheckoutPhase> {
    let record = session
        .get::<PhaseRecord>(session_keys::CHECKOUT_PHASE)
        .await?;

    Ok(record.map_or_else(CheckoutPhase::default, |record| {
        let phase = record.current(Utc::now(), stale_after);
        if phase != record.phase {
            tracing::warn!(from = %record.phase, since = %record.since, "Abandoned checkout attempt reset");
        }
        phase
    }))
}

async fn store_phase(session: &Session, phase: CheckoutPhase) -> Result<()> {
    session
        .insert(session_keys::CHECKOUT_PHASE, PhaseRecord::entered(phase))
        .await?;
    Ok(())
}

/// Live cart, or the snapshot saved by the checkout guard when the live cart
/// is empty. A recovered snapshot becomes the live cart again.
async fn checkout_cart(session: &Session, snapshots: &SessionSnapshotStore) -> Result<Cart> {
    let live = load_cart(session).await?;
    let was_empty = live.is_empty();
    let cart = recover_cart(live, snapshots).await?;

    if was_empty && !cart.is_empty() {
        tracing::info!(items = cart.items().len(), "Recovered cart from checkout snapshot");
        save_cart(session, &cart).await?;
    }

    Ok(cart)
}

/// Display the checkout view.
#[instrument(skip_all, fields(user = %user.email))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let snapshots = SessionSnapshotStore::new(session.clone());
    let cart = checkout_cart(&session, &snapshots).await?;

    // Leave an in-flight submission alone so a retry still sees it.
    let mut phase = load_phase(&session, state.config().backend.timeout).await?;
    if !phase.is_in_flight() {
        phase = CheckoutPhase::default();
        store_phase(&session, phase).await?;
    }

    Ok(Json(CheckoutView {
        cart: CartView::from(&cart),
        phase,
        email: user.email,
    }))
}

/// Submit the checkout form.
#[instrument(skip_all, fields(user = %user.email))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Response> {
    let phase = load_phase(&session, state.config().backend.timeout).await?;
    if phase.is_in_flight() {
        tracing::warn!(%phase, "Duplicate checkout submission rejected");
        return Err(AppError::Conflict(
            "Your order is already being submitted".to_string(),
        ));
    }

    let snapshots = SessionSnapshotStore::new(session.clone());
    let cart = checkout_cart(&session, &snapshots).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let phase = phase.transition(CheckoutEvent::Submit)?;

    let errors = form.validate();
    if !errors.is_empty() {
        store_phase(&session, phase.transition(CheckoutEvent::ValidationFailed)?).await?;
        tracing::warn!(fields = errors.len(), "Checkout form rejected");
        return Err(errors.into());
    }

    let Ok(email) = Email::parse(form.email.trim()) else {
        return Err(AppError::BadRequest("Please enter a valid email address".to_string()));
    };

    let phase = phase.transition(CheckoutEvent::ValidationPassed)?;
    store_phase(&session, phase).await?;
    // Persist now so a concurrent submission sees `Submitting`.
    session.save().await?;

    let request = OrderEmailRequest::new(&cart, email, &form);
    if let Err(e) = state.backend().send_order_email(&request).await {
        tracing::error!(error = %e, "Failed to send order confirmation");
        store_phase(&session, phase.transition(CheckoutEvent::SubmissionFailed)?).await?;
        // The session layer does not persist on 5xx responses.
        session.save().await?;
        return Err(e.into());
    }

    store_phase(&session, phase.transition(CheckoutEvent::SubmissionSucceeded)?).await?;
    save_cart(&session, &Cart::new()).await?;
    snapshots.clear().await?;

    tracing::debug!(to = %request.email, "Order confirmation sent");
    let confirmation = OrderConfirmation {
        email: request.email.into_inner(),
        details: request.order_details,
        placed_at: Utc::now(),
    };
    tracing::info!(
        items = confirmation.details.items.len(),
        total = %confirmation.details.total,
        "Order placed"
    );
    add_breadcrumb("checkout", "Order placed", Some(&[("total", confirmation.details.total.as_str())]));
    session
        .insert(session_keys::LAST_ORDER, &confirmation)
        .await?;

    Ok(Redirect::to("/checkout/success").into_response())
}

/// Confirmation view for the last completed order.
#[instrument(skip_all)]
pub async fn success(session: Session) -> Result<Json<CheckoutSuccessView>> {
    let order = session
        .get::<OrderConfirmation>(session_keys::LAST_ORDER)
        .await?
        .ok_or_else(|| AppError::NotFound("No completed order".to_string()))?;

    Ok(Json(CheckoutSuccessView {
        message: ORDER_PLACED_MESSAGE,
        order,
    }))
}
