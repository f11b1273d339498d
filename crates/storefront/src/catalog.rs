//! Product catalogue.
//!
//! The storefront sells a fixed line-up of consumer cameras, so the
//! catalogue is compiled in rather than fetched.

use serde::Serialize;

use securevision_core::{CartItem, Price, ProductId};

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub features: Vec<String>,
    /// Technical specifications in display order.
    pub specs: Vec<Spec>,
}

/// One technical specification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spec {
    pub label: String,
    pub value: String,
}

impl Product {
    /// A cart line item for one unit of this product.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem::new(self.id, self.name.clone(), self.price, self.image.clone())
    }
}

/// Listing card data (no features or specs).
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub url: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            url: format!("/products/{}", product.id),
        }
    }
}

/// The product catalogue.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

struct ProductSeed {
    id: i32,
    name: &'static str,
    description: &'static str,
    cents: u32,
    features: [&'static str; 6],
    specs: [(&'static str, &'static str); 6],
}

const SEEDS: [ProductSeed; 3] = [
    ProductSeed {
        id: 1,
        name: "SmartCam Pro",
        description: "4K Ultra HD Smart Security Camera with Night Vision",
        cents: 19_999,
        features: [
            "4K Ultra HD Resolution",
            "Advanced Night Vision",
            "AI Motion Detection",
            "Two-way Audio",
            "Weather Resistant",
            "Cloud Storage Ready",
        ],
        specs: [
            ("Resolution", "3840 x 2160"),
            ("Field of view", "160°"),
            ("Night vision", "Up to 30ft"),
            ("Storage", "MicroSD up to 128GB"),
            ("Connectivity", "2.4GHz/5GHz WiFi"),
            ("Power", "DC 12V/2A"),
        ],
    },
    ProductSeed {
        id: 2,
        name: "DoorGuard Elite",
        description: "Smart Doorbell Camera with Two-Way Audio",
        cents: 14_999,
        features: [
            "HD Video Quality",
            "Two-way Audio",
            "Motion Detection",
            "Night Vision",
            "Mobile App Control",
            "Easy Installation",
        ],
        specs: [
            ("Resolution", "1080p HD"),
            ("Field of view", "180°"),
            ("Night vision", "Up to 20ft"),
            ("Storage", "Cloud Storage"),
            ("Connectivity", "2.4GHz WiFi"),
            ("Power", "Battery Powered"),
        ],
    },
    ProductSeed {
        id: 3,
        name: "SecureView 360",
        description: "360° Panoramic Security Camera with Motion Tracking",
        cents: 29_999,
        features: [
            "360° Coverage",
            "Auto Motion Tracking",
            "4K Resolution",
            "Smart Notifications",
            "Two-way Audio",
            "Indoor/Outdoor Use",
        ],
        specs: [
            ("Resolution", "4K HD"),
            ("Field of view", "360°"),
            ("Night vision", "Up to 50ft"),
            ("Storage", "MicroSD/Cloud"),
            ("Connectivity", "2.4GHz/5GHz WiFi"),
            ("Power", "AC Powered"),
        ],
    },
];

impl Catalog {
    /// The built-in camera line-up.
    #[must_use]
    pub fn builtin() -> Self {
        let products = SEEDS
            .iter()
            .map(|seed| Product {
                id: ProductId::new(seed.id),
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                price: Price::from_cents(seed.cents),
                image: format!("/static/images/{}.jpg", seed.id),
                features: seed.features.iter().map(ToString::to_string).collect(),
                specs: seed
                    .specs
                    .iter()
                    .map(|(label, value)| Spec {
                        label: (*label).to_string(),
                        value: (*value).to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self { products }
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up a product by the raw id from a URL; non-numeric ids are simply not found.
    #[must_use]
    pub fn find_by_param(&self, raw: &str) -> Option<&Product> {
        raw.parse::<ProductId>().ok().and_then(|id| self.find(id))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 3);

        let smartcam = catalog.find(ProductId::new(1));
        assert_eq!(smartcam.map(|p| p.price.to_string()), Some("$199.99".to_string()));
        assert!(catalog.products().iter().all(|p| p.features.len() == 6 && p.specs.len() == 6));
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let catalog = Catalog::builtin();
        assert!(catalog.find(ProductId::new(42)).is_none());
        assert!(catalog.find_by_param("42").is_none());
        assert!(catalog.find_by_param("smartcam").is_none());
        assert_eq!(catalog.find_by_param("3").map(|p| p.name.as_str()), Some("SecureView 360"));
    }

    #[test]
    fn test_to_cart_item() {
        let catalog = Catalog::builtin();
        let item = catalog.find(ProductId::new(2)).map(Product::to_cart_item);
        assert_eq!(item.as_ref().map(|i| i.quantity), Some(1));
        assert_eq!(item.map(|i| i.image), Some("/static/images/2.jpg".to_string()));
    }
}
