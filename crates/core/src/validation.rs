//! Form field validation.
//!
//! Every predicate is a pure function over the raw string the visitor typed.
//! Whole-form validation runs every field check (no short-circuit) so all
//! failing fields can be reported at once.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::order::ShippingAddress;
use crate::types::Email;

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("card number pattern is valid"));
static EXPIRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("expiry pattern is valid")
});
static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvc pattern is valid"));
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5,6}$").expect("postal code pattern is valid"));

/// `local@domain.tld` with no whitespace.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    Email::parse(email).is_ok()
}

/// Exactly 16 digits once whitespace is stripped (`"4111 1111 1111 1111"` passes).
#[must_use]
pub fn validate_card_number(number: &str) -> bool {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    CARD_NUMBER_RE.is_match(&digits)
}

/// `MM/YY` with a month between 01 and 12.
///
/// The date is not compared against the current month.
#[must_use]
pub fn validate_expiry(expiry: &str) -> bool {
    EXPIRY_RE.is_match(expiry)
}

/// Three or four digits.
#[must_use]
pub fn validate_cvc(cvc: &str) -> bool {
    CVC_RE.is_match(cvc)
}

/// Five or six digits.
#[must_use]
pub fn validate_postal_code(code: &str) -> bool {
    POSTAL_CODE_RE.is_match(code)
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Field name to error message, holding only the fields that failed.
///
/// Recomputed wholesale on submit; a single entry is cleared when the visitor
/// edits that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors<F: Ord>(BTreeMap<F, String>);

impl<F: Ord> Default for ValidationErrors<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: Ord + Copy> ValidationErrors<F> {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any previous message.
    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Clear the error for a single field.
    pub fn clear(&mut self, field: F) {
        self.0.remove(&field);
    }

    /// Error message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields in field order.
    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.0.keys().copied()
    }
}

// =============================================================================
// Checkout Form
// =============================================================================

/// Fields of the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutField {
    Name,
    Email,
    Address,
    City,
    Country,
    PostalCode,
    CardNumber,
    Expiry,
    Cvc,
}

impl CheckoutField {
    /// All fields in form order.
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Email,
        Self::Address,
        Self::City,
        Self::Country,
        Self::PostalCode,
        Self::CardNumber,
        Self::Expiry,
        Self::Cvc,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Full name",
            Self::Email => "Email",
            Self::Address => "Address",
            Self::City => "City",
            Self::Country => "Country",
            Self::PostalCode => "Postal code",
            Self::CardNumber => "Card number",
            Self::Expiry => "Expiry date",
            Self::Cvc => "CVC",
        }
    }
}

/// Shipping and payment details collected at checkout.
///
/// A flat mapping of field name to the raw string typed by the visitor.
/// `Debug` redacts the payment fields.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
}

impl fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("country", &self.country)
            .field("postal_code", &self.postal_code)
            .field("card_number", &"[REDACTED]")
            .field("expiry", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

impl CheckoutForm {
    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::Name => &self.name,
            CheckoutField::Email => &self.email,
            CheckoutField::Address => &self.address,
            CheckoutField::City => &self.city,
            CheckoutField::Country => &self.country,
            CheckoutField::PostalCode => &self.postal_code,
            CheckoutField::CardNumber => &self.card_number,
            CheckoutField::Expiry => &self.expiry,
            CheckoutField::Cvc => &self.cvc,
        }
    }

    /// Overwrite a field and clear its pending error.
    pub fn edit(
        &mut self,
        errors: &mut ValidationErrors<CheckoutField>,
        field: CheckoutField,
        value: impl Into<String>,
    ) {
        let value = value.into();
        match field {
            CheckoutField::Name => self.name = value,
            CheckoutField::Email => self.email = value,
            CheckoutField::Address => self.address = value,
            CheckoutField::City => self.city = value,
            CheckoutField::Country => self.country = value,
            CheckoutField::PostalCode => self.postal_code = value,
            CheckoutField::CardNumber => self.card_number = value,
            CheckoutField::Expiry => self.expiry = value,
            CheckoutField::Cvc => self.cvc = value,
        }
        errors.clear(field);
    }

    /// Validate every field independently.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors<CheckoutField> {
        let mut errors = ValidationErrors::new();

        for field in CheckoutField::ALL {
            if let Some(message) = Self::check(field, self.get(field)) {
                errors.insert(field, message);
            }
        }

        errors
    }

    fn check(field: CheckoutField, value: &str) -> Option<String> {
        let valid = match field {
            CheckoutField::Name
            | CheckoutField::Address
            | CheckoutField::City
            | CheckoutField::Country => {
                return (!is_present(value)).then(|| format!("{} is required", field.label()));
            }
            CheckoutField::Email => validate_email(value),
            CheckoutField::PostalCode => validate_postal_code(value),
            CheckoutField::CardNumber => validate_card_number(value),
            CheckoutField::Expiry => validate_expiry(value),
            CheckoutField::Cvc => validate_cvc(value),
        };

        if valid {
            return None;
        }

        let message = match field {
            CheckoutField::Email => "Please enter a valid email address",
            CheckoutField::PostalCode => "Postal code must be 5 or 6 digits",
            CheckoutField::CardNumber => "Card number must be 16 digits",
            CheckoutField::Expiry => "Expiry date must be MM/YY",
            _ => "CVC must be 3 or 4 digits",
        };
        Some(message.to_string())
    }

    /// Shipping address portion of the form, trimmed.
    #[must_use]
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        }
    }
}

// =============================================================================
// Demo Request Form
// =============================================================================

/// Company size buckets offered by the demo request form.
pub const EMPLOYEE_RANGES: [&str; 5] = ["1-10", "11-50", "51-200", "201-500", "501+"];

/// Fields of the enterprise demo request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DemoField {
    Name,
    Email,
    Company,
    Phone,
    Employees,
    Message,
}

/// Enterprise demo request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoRequestForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub employees: String,
    pub message: String,
}

impl DemoRequestForm {
    /// Validate every field independently. The message is optional.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors<DemoField> {
        let mut errors = ValidationErrors::new();

        if !is_present(&self.name) {
            errors.insert(DemoField::Name, "Full name is required");
        }
        if !validate_email(self.email.trim()) {
            errors.insert(DemoField::Email, "Please enter a valid business email");
        }
        if !is_present(&self.company) {
            errors.insert(DemoField::Company, "Company name is required");
        }
        if !is_present(&self.phone) {
            errors.insert(DemoField::Phone, "Phone number is required");
        }
        if !EMPLOYEE_RANGES.contains(&self.employees.as_str()) {
            errors.insert(DemoField::Employees, "Please select the number of employees");
        }

        errors
    }
}
