//! Session-backed cart snapshot repository.
//!
//! The checkout guard writes the cart here before redirecting; the checkout
//! view reads it back when the live cart is empty.

use securevision_core::{CartSnapshot, SnapshotRepository};
use tower_sessions::Session;

use crate::models::session_keys;

/// Stores the cart snapshot under the `checkoutItems` session key.
#[derive(Debug, Clone)]
pub struct SessionSnapshotStore {
    session: Session,
}

impl SessionSnapshotStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl SnapshotRepository for SessionSnapshotStore {
    type Error = tower_sessions::session::Error;

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), Self::Error> {
        self.session
            .insert(session_keys::CHECKOUT_ITEMS, snapshot)
            .await
    }

    async fn load(&self) -> Result<Option<CartSnapshot>, Self::Error> {
        self.session.get(session_keys::CHECKOUT_ITEMS).await
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        self.session
            .remove::<CartSnapshot>(session_keys::CHECKOUT_ITEMS)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use securevision_core::{Cart, CartAction, CartItem, Price, ProductId};
    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = SessionSnapshotStore::new(session.clone());

        let cart = Cart::new().reduce(CartAction::Add(CartItem::new(
            ProductId::new(1),
            "SmartCam Pro",
            Price::parse("$199.99").unwrap(),
            "/static/images/1.jpg",
        )));

        assert!(store.load().await.unwrap().is_none());
        store.save(&CartSnapshot::of(&cart)).await.unwrap();

        let raw: serde_json::Value = session
            .get(session_keys::CHECKOUT_ITEMS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw[0]["name"], "SmartCam Pro");

        assert_eq!(
            store.load().await.unwrap().map(CartSnapshot::into_cart),
            Some(cart)
        );

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
