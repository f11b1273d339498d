//! Domain models for storefront.

pub mod session;

pub use session::{CurrentUser, OrderConfirmation, PhaseRecord, keys as session_keys};
