//! SecureVision Core - Shared domain library.
//!
//! This crate provides the domain types and state transitions used by the
//! storefront:
//! - `storefront` - Public-facing shop (products, cart, checkout, demo requests, video analytics)
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types, pure transition functions and traits -
//! no HTTP, no sessions. State changes are expressed as typed messages
//! ([`CartAction`], [`CheckoutEvent`]) applied by reducer-style functions, and
//! the durable cart snapshot sits behind the [`SnapshotRepository`] trait so
//! the recovery policy can be tested without a session store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and emails
//! - [`validation`] - Field predicates and whole-form validation
//! - [`cart`] - Cart line items and the cart reducer
//! - [`snapshot`] - Cart snapshot persistence interface
//! - [`checkout`] - Checkout guard, snapshot recovery and the checkout phase machine
//! - [`order`] - Order confirmation payload sent to the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod order;
pub mod snapshot;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartAction, CartItem};
pub use checkout::{
    CheckoutEvent, CheckoutPhase, GuardDecision, TransitionError, guard_checkout, recover_cart,
    safe_return_path,
};
pub use order::{OrderDetails, OrderEmailRequest, ShippingAddress};
pub use snapshot::{CartSnapshot, InMemorySnapshotRepository, SnapshotRepository};
pub use types::*;
pub use validation::{CheckoutField, CheckoutForm, DemoField, DemoRequestForm, ValidationErrors};
