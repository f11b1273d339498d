//! Enterprise demo request handler.

use axum::{Json, extract::State};
use tracing::instrument;

use securevision_core::DemoRequestForm;

use crate::error::Result;
use crate::routes::auth::MessageResponse;
use crate::state::AppState;

const DEMO_REQUESTED_MESSAGE: &str = "We've received your demo request and will contact you \
                                      within 24 hours to schedule your personalized demo.";

/// Validate and forward a demo request.
#[instrument(skip_all, fields(company = %form.company, employees = %form.employees))]
pub async fn request_demo(
    State(state): State<AppState>,
    Json(form): Json<DemoRequestForm>,
) -> Result<Json<MessageResponse>> {
    let errors = form.validate();
    if !errors.is_empty() {
        tracing::warn!(fields = errors.len(), "Demo request rejected");
        return Err(errors.into());
    }

    if let Err(e) = state.backend().request_demo(&form).await {
        tracing::error!(error = %e, "Failed to forward demo request");
        return Err(e.into());
    }

    tracing::info!("Demo request forwarded");
    Ok(Json(MessageResponse {
        message: DEMO_REQUESTED_MESSAGE,
    }))
}
