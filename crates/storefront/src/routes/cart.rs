//! Cart route handlers.
//!
//! The live cart is a [`Cart`] value stored in the session. Each handler loads
//! it, applies one [`CartAction`] and stores it back.

use std::ops::RangeInclusive;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use securevision_core::{Cart, CartAction, CartItem, GuardDecision, Price, ProductId, guard_checkout};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, login_redirect_url};
use crate::models::session_keys;
use crate::routes::products::PRODUCT_NOT_FOUND;
use crate::services::SessionSnapshotStore;
use crate::state::AppState;

/// Quantities offered by the cart's quantity selector.
pub const QUANTITY_CHOICES: RangeInclusive<u32> = 1..=5;

/// Path the checkout guard sends visitors back to after login.
const CART_PATH: &str = "/cart";

// =============================================================================
// Views
// =============================================================================

/// One cart line as displayed.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
    pub line_total: Price,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: Price,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the live cart from the session (empty when none is stored).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> std::result::Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the live cart in the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Load the cart, apply one action and store the result.
async fn update_cart(session: &Session, action: CartAction) -> Result<Cart> {
    let cart = load_cart(session).await?.reduce(action);
    save_cart(session, &cart).await?;
    Ok(cart)
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip_all)]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a catalogue product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .find(body.product_id)
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    let cart = update_cart(&session, CartAction::Add(product.to_cart_item())).await?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    tracing::debug!(product_id = %body.product_id, item_count = cart.item_count(), "Added to cart");

    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    if !QUANTITY_CHOICES.contains(&body.quantity) {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between {} and {}",
            QUANTITY_CHOICES.start(),
            QUANTITY_CHOICES.end()
        )));
    }

    let cart = update_cart(
        &session,
        CartAction::SetQuantity {
            id: body.product_id,
            quantity: body.quantity,
        },
    )
    .await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let cart = update_cart(&session, CartAction::Remove(body.product_id)).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let cart = update_cart(&session, CartAction::Clear).await?;
    Ok(Json(CartView::from(&cart)))
}

/// "Proceed to checkout": snapshot the cart, then continue to checkout or
/// detour through login.
#[instrument(skip_all)]
pub async fn checkout(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let snapshots = SessionSnapshotStore::new(session.clone());
    let decision = guard_checkout(user.is_some(), &cart, &snapshots, CART_PATH).await?;

    Ok(match decision {
        GuardDecision::Proceed => Redirect::to("/checkout").into_response(),
        GuardDecision::RedirectToLogin { return_to } => {
            tracing::info!(items = cart.items().len(), "Checkout requires login, cart saved");
            Redirect::to(&login_redirect_url(&return_to)).into_response()
        }
    })
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

    fn smartcam() -> CartItem {
        CartItem::new(ProductId::new(1), "SmartCam Pro", Price::from_cents(19_999), "/static/images/1.jpg")
    }

    #[tokio::test]
    async fn test_cart_persists_between_actions() {
        let session = session();
        assert!(load_cart(&session).await.unwrap().is_empty());

        update_cart(&session, CartAction::Add(smartcam())).await.unwrap();
        update_cart(&session, CartAction::Add(smartcam())).await.unwrap();

        let cart = load_cart(&session).await.unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total().to_string(), "$399.98");
    }

    #[test]
    fn test_cart_view_line_totals() {
        let cart = Cart::new().reduce(CartAction::Add(smartcam())).reduce(CartAction::SetQuantity {
            id: ProductId::new(1),
            quantity: 3,
        });

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].line_total.to_string(), "$599.97");
        assert_eq!(view.total.to_string(), "$599.97");
    }

    #[test]
    fn test_quantity_choices() {
        assert!(!QUANTITY_CHOICES.contains(&0));
        assert!(QUANTITY_CHOICES.contains(&5));
        assert!(!QUANTITY_CHOICES.contains(&6));
    }
}
