//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::catalog::{Product, ProductSummary};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Message returned for unknown product ids.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Product listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<ProductSummary>> {
    Json(
        state
            .catalog()
            .products()
            .iter()
            .map(ProductSummary::from)
            .collect(),
    )
}

/// Product detail.
///
/// The id is taken as a raw string so that non-numeric ids are a 404 like
/// any other unknown product, not a path rejection.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .find_by_param(&id)
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    add_breadcrumb("navigation", "Viewed product", Some(&[("product_id", id.as_str())]));

    Ok(Json(product.clone()))
}
