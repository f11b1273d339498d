//! Cart snapshot persistence.
//!
//! Before the checkout guard hands the visitor to the login flow (or on to
//! payment) the current cart is written to a durable slot. If the live cart
//! turns up empty at the checkout view, the snapshot is used instead.
//! [`SnapshotRepository`] abstracts the slot so the recovery policy can be
//! exercised without a session store.

use core::convert::Infallible;
use core::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};

/// Serialized copy of the cart line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(Vec<CartItem>);

impl CartSnapshot {
    /// Capture the current cart.
    #[must_use]
    pub fn of(cart: &Cart) -> Self {
        Self(cart.items().to_vec())
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rebuild a cart from the snapshot.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        Cart::from_items(self.0)
    }
}

/// A durable key-value slot holding one cart snapshot.
pub trait SnapshotRepository {
    /// Storage error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Overwrite the stored snapshot.
    fn save(&self, snapshot: &CartSnapshot) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Read the stored snapshot, if any.
    fn load(&self) -> impl Future<Output = Result<Option<CartSnapshot>, Self::Error>> + Send;

    /// Drop the stored snapshot.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Process-local repository, used in tests and tools.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    slot: Mutex<Option<CartSnapshot>>,
}

impl InMemorySnapshotRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: CartSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
        }
    }

    /// Current contents of the slot.
    #[must_use]
    pub fn peek(&self) -> Option<CartSnapshot> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    type Error = Infallible;

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), Self::Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<CartSnapshot>, Self::Error> {
        Ok(self.peek())
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
