//! Home page and navbar summary.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::ProductSummary;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::cart::load_cart;
use crate::state::AppState;

/// What the navbar shows on every page.
#[derive(Debug, Serialize)]
pub struct Navbar {
    pub authenticated: bool,
    pub user: Option<CurrentUser>,
    /// Badge count: sum of cart quantities.
    pub cart_count: u32,
}

impl Navbar {
    /// Build the navbar for the current visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read from the session.
    pub async fn for_visitor(
        user: Option<CurrentUser>,
        session: &Session,
    ) -> std::result::Result<Self, tower_sessions::session::Error> {
        let cart = load_cart(session).await?;
        Ok(Self {
            authenticated: user.is_some(),
            user,
            cart_count: cart.item_count(),
        })
    }
}

/// Home page data.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub navbar: Navbar,
    pub products: Vec<ProductSummary>,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<HomeView>> {
    let navbar = Navbar::for_visitor(user, &session).await?;
    let products = state
        .catalog()
        .products()
        .iter()
        .map(ProductSummary::from)
        .collect();

    Ok(Json(HomeView { navbar, products }))
}
