//! Order confirmation payload.
//!
//! After a successful checkout the storefront asks the backend to email an
//! order confirmation. Field names follow the backend's camelCase schema.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::types::Email;
use crate::validation::CheckoutForm;

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

/// Cart contents, computed total and shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub items: Vec<CartItem>,
    /// Two-decimal amount without currency symbol, e.g. `"349.98"`.
    pub total: String,
    pub shipping_address: ShippingAddress,
}

/// Body of `POST /api/send-order-email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmailRequest {
    pub email: Email,
    pub order_details: OrderDetails,
}

impl OrderEmailRequest {
    /// Build the request from the checkout cart, the parsed confirmation
    /// address and a validated form.
    #[must_use]
    pub fn new(cart: &Cart, email: Email, form: &CheckoutForm) -> Self {
        Self {
            email,
            order_details: OrderDetails {
                items: cart.items().to_vec(),
                total: cart.total().to_plain_string(),
                shipping_address: form.shipping_address(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartAction;
    use crate::types::{Price, ProductId};

    #[test]
    fn test_wire_format() {
        let cart = Cart::new()
            .reduce(CartAction::Add(CartItem::new(
                ProductId::new(2),
                "DoorGuard Elite",
                Price::parse("$149.99").unwrap(),
                "/static/images/2.jpg",
            )))
            .reduce(CartAction::SetQuantity {
                id: ProductId::new(2),
                quantity: 2,
            });
        let form = CheckoutForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Loop".to_string(),
            city: "Austin".to_string(),
            country: "USA".to_string(),
            postal_code: "73301".to_string(),
            ..CheckoutForm::default()
        };

        let email = Email::parse(&form.email).unwrap();
        let json = serde_json::to_value(OrderEmailRequest::new(&cart, email, &form)).unwrap();

        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["orderDetails"]["total"], "299.98");
        assert_eq!(json["orderDetails"]["items"][0]["name"], "DoorGuard Elite");
        assert_eq!(json["orderDetails"]["items"][0]["quantity"], 2);
        assert_eq!(json["orderDetails"]["shippingAddress"]["postalCode"], "73301");
    }
}
