//! Checkout flow: the authentication guard, snapshot recovery and the
//! checkout phase machine.
//!
//! ```text
//! Editing --Submit--> Validating --ValidationFailed--> Editing
//!                                --ValidationPassed--> Submitting --SubmissionSucceeded--> Success
//!                                                                 --SubmissionFailed-----> Editing
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::snapshot::{CartSnapshot, SnapshotRepository};

// =============================================================================
// Checkout Guard
// =============================================================================

/// Outcome of the checkout guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Authenticated: continue to the checkout view.
    Proceed,
    /// Not authenticated: send the visitor to login, then back to `return_to`.
    RedirectToLogin { return_to: String },
}

/// Gate entry to payment on authentication.
///
/// The cart is snapshotted in both cases: before the login redirect so it
/// survives the round trip, and before proceeding so a reload of the checkout
/// view can recover it.
///
/// # Errors
///
/// Returns the repository error if the snapshot cannot be saved.
pub async fn guard_checkout<R: SnapshotRepository>(
    authenticated: bool,
    cart: &Cart,
    repo: &R,
    current_path: &str,
) -> Result<GuardDecision, R::Error> {
    repo.save(&CartSnapshot::of(cart)).await?;

    if authenticated {
        Ok(GuardDecision::Proceed)
    } else {
        Ok(GuardDecision::RedirectToLogin {
            return_to: safe_return_path(current_path).to_string(),
        })
    }
}

/// Cart to show at the checkout view.
///
/// Uses the live cart unless it is empty and a persisted snapshot exists.
///
/// # Errors
///
/// Returns the repository error if the snapshot cannot be read.
pub async fn recover_cart<R: SnapshotRepository>(live: Cart, repo: &R) -> Result<Cart, R::Error> {
    if !live.is_empty() {
        return Ok(live);
    }

    Ok(match repo.load().await? {
        Some(snapshot) if !snapshot.is_empty() => snapshot.into_cart(),
        _ => live,
    })
}

/// Accept only local absolute paths as redirect targets; anything else maps to `/`.
#[must_use]
pub fn safe_return_path(path: &str) -> &str {
    let is_local = path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.contains("://");
    if is_local { path } else { "/" }
}

// =============================================================================
// Phase Machine
// =============================================================================

/// Where a checkout attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Editing,
    Validating,
    Submitting,
    Success,
}

/// Inputs that drive the checkout phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutEvent {
    Submit,
    ValidationFailed,
    ValidationPassed,
    SubmissionSucceeded,
    SubmissionFailed,
}

/// An event that is not valid in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event:?} while {from}")]
pub struct TransitionError {
    pub from: CheckoutPhase,
    pub event: CheckoutEvent,
}

impl CheckoutPhase {
    /// Next phase for an event.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` for any transition outside the machine.
    pub const fn transition(self, event: CheckoutEvent) -> Result<Self, TransitionError> {
        use CheckoutEvent as E;

        match (self, event) {
            (Self::Editing, E::Submit) => Ok(Self::Validating),
            (Self::Validating, E::ValidationFailed) | (Self::Submitting, E::SubmissionFailed) => {
                Ok(Self::Editing)
            }
            (Self::Validating, E::ValidationPassed) => Ok(Self::Submitting),
            (Self::Submitting, E::SubmissionSucceeded) => Ok(Self::Success),
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    /// `Success` is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success)
    }

    /// A request is already being validated or submitted.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Success => "success",
        };
        f.write_str(name)
    }
}
