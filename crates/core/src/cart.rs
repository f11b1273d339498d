//! Cart line items and the cart reducer.
//!
//! The cart is a plain value. Every change is a [`CartAction`] applied by
//! [`Cart::apply`] (or the consuming [`Cart::reduce`]); totals are always
//! folded from the current items and never cached.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price, serialized as `"$NN.NN"`.
    pub price: Price,
    /// Image reference (URL path).
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Create a line item with quantity 1.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: image.into(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Messages accepted by the cart reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit. Merges into an existing line with the same id,
    /// otherwise appends the item with quantity 1.
    Add(CartItem),
    /// Delete the line with this id. No-op when absent.
    Remove(ProductId),
    /// Overwrite the quantity of a line (not an increment). No-op when absent.
    SetQuantity { id: ProductId, quantity: u32 },
    /// Remove every line.
    Clear,
}

/// Ordered list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing line items (e.g. a recovered snapshot).
    #[must_use]
    pub const fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Apply an action in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add(item) => {
                if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
                    existing.quantity = existing.quantity.saturating_add(1);
                } else {
                    self.items.push(CartItem { quantity: 1, ..item });
                }
            }
            CartAction::Remove(id) => self.items.retain(|i| i.id != id),
            CartAction::SetQuantity { id, quantity } => {
                if let Some(existing) = self.items.iter_mut().find(|i| i.id == id) {
                    existing.quantity = quantity;
                }
            }
            CartAction::Clear => self.items.clear(),
        }
    }

    /// Consume the cart and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: CartAction) -> Self {
        self.apply(action);
        self
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart and return its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Line item for a product, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price times quantity over the current items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, i| count.saturating_add(i.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn smartcam() -> CartItem {
        CartItem::new(
            ProductId::new(1),
            "SmartCam Pro",
            Price::parse("$199.99").unwrap(),
            "/static/images/1.jpg",
        )
    }

    fn doorguard() -> CartItem {
        CartItem::new(
            ProductId::new(2),
            "DoorGuard Elite",
            Price::parse("$149.99").unwrap(),
            "/static/images/2.jpg",
        )
    }

    fn expected_total(cart: &Cart) -> Price {
        let mut sum = Price::ZERO;
        for item in cart.items() {
            sum = [sum, item.price.times(item.quantity)].into_iter().sum();
        }
        sum
    }

    #[test]
    fn test_add_appends_with_quantity_one() {
        let cart = Cart::new().reduce(CartAction::Add(CartItem {
            quantity: 7,
            ..smartcam()
        }));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_existing_increments_instead_of_duplicating() {
        let cart = Cart::new()
            .reduce(CartAction::Add(smartcam()))
            .reduce(CartAction::Add(doorguard()))
            .reduce(CartAction::Add(smartcam()));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(cart.items()[0].id, ProductId::new(1));
    }

    #[test]
    fn test_add_saturates_at_max_quantity() {
        let cart = Cart::new()
            .reduce(CartAction::Add(smartcam()))
            .reduce(CartAction::Add(doorguard()))
            .reduce(CartAction::SetQuantity {
                id: ProductId::new(1),
                quantity: u32::MAX,
            })
            .reduce(CartAction::Add(smartcam()));

        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, u32::MAX);
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let cart = Cart::new()
            .reduce(CartAction::Add(smartcam()))
            .reduce(CartAction::Add(smartcam()))
            .reduce(CartAction::SetQuantity {
                id: ProductId::new(1),
                quantity: 4,
            });
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 4);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let cart = Cart::new().reduce(CartAction::Add(smartcam()));
        let same = cart
            .clone()
            .reduce(CartAction::Remove(ProductId::new(9)))
            .reduce(CartAction::SetQuantity {
                id: ProductId::new(9),
                quantity: 3,
            });
        assert_eq!(cart, same);
    }

    #[test]
    fn test_remove_and_clear() {
        let cart = Cart::new()
            .reduce(CartAction::Add(smartcam()))
            .reduce(CartAction::Add(doorguard()))
            .reduce(CartAction::Remove(ProductId::new(1)));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.reduce(CartAction::Clear).is_empty());
    }

    #[test]
    fn test_total_tracks_every_action_sequence() {
        let actions = [
            CartAction::Add(smartcam()),
            CartAction::Add(doorguard()),
            CartAction::Add(smartcam()),
            CartAction::SetQuantity {
                id: ProductId::new(2),
                quantity: 5,
            },
            CartAction::Remove(ProductId::new(1)),
            CartAction::Add(smartcam()),
            CartAction::SetQuantity {
                id: ProductId::new(1),
                quantity: 3,
            },
        ];

        let mut cart = Cart::new();
        for action in actions {
            cart.apply(action);
            assert_eq!(cart.total(), expected_total(&cart));
        }

        // 5 x 149.99 + 3 x 199.99
        assert_eq!(cart.total().to_string(), "$1349.92");
        assert_eq!(cart.item_count(), 8);
    }

    #[test]
    fn test_empty_cart_total() {
        assert_eq!(Cart::new().total(), Price::ZERO);
        assert_eq!(Cart::new().item_count(), 0);
    }

    #[test]
    fn test_serializes_as_item_list() {
        let cart = Cart::new().reduce(CartAction::Add(smartcam()));
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["price"], "$199.99");
        assert_eq!(json[0]["quantity"], 1);
    }
}
