//! Session-related types.
//!
//! Everything the visitor's browser would otherwise hold in memory or local
//! storage lives in the session under these keys.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use securevision_core::{CheckoutPhase, OrderDetails};

/// Session-stored user identity, as returned by the backend on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's email address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Summary of the last completed order, shown on the success view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Address the confirmation email was sent to.
    pub email: String,
    /// What was ordered and where it ships.
    pub details: OrderDetails,
    /// When the order was submitted.
    pub placed_at: DateTime<Utc>,
}

/// Checkout phase of the current attempt and when it was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: CheckoutPhase,
    pub since: DateTime<Utc>,
}

impl PhaseRecord {
    /// Record `phase` as entered now.
    #[must_use]
    pub fn entered(phase: CheckoutPhase) -> Self {
        Self {
            phase,
            since: Utc::now(),
        }
    }

    /// Phase as of `now`.
    ///
    /// An in-flight phase older than `stale_after` belongs to a request that
    /// was dropped before it could record its outcome, and counts as `Editing`.
    #[must_use]
    pub fn current(&self, now: DateTime<Utc>, stale_after: Duration) -> CheckoutPhase {
        let abandoned = self.phase.is_in_flight()
            && now
                .signed_duration_since(self.since)
                .to_std()
                .is_ok_and(|age| age > stale_after);

        if abandoned {
            CheckoutPhase::Editing
        } else {
            self.phase
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the live cart.
    pub const CART: &str = "cart";

    /// Key for the cart snapshot written by the checkout guard.
    pub const CHECKOUT_ITEMS: &str = "checkoutItems";

    /// Key for the backend access token.
    pub const ACCESS_TOKEN: &str = "token";

    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the [`PhaseRecord`](super::PhaseRecord) of the current attempt.
    pub const CHECKOUT_PHASE: &str = "checkout_phase";

    /// Key for the last completed order.
    pub const LAST_ORDER: &str = "last_order";
}
