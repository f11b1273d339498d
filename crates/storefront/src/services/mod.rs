//! Business logic services for storefront.
//!
//! # Services
//!
//! - `backend` - HTTP client for the orders/auth/video-analysis backend
//! - `snapshot` - Session-backed cart snapshot repository

pub mod backend;
pub mod snapshot;

pub use backend::{BackendClient, BackendError, LoginSession, VideoAnalysis};
pub use snapshot::SessionSnapshotStore;
