//! # Validation Module
//!
//! Input validation for the storefront's forms and quantity controls.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screen / CLI input                                           │
//! │  └── THIS MODULE: phone, pincode, email, name, UPI id, quantity        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend                                                       │
//! │  ├── Stock checks on add                                               │
//! │  ├── Single-pharmacy cart rule                                         │
//! │  └── Minimum order amount                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medimart_core::validation::{format_phone, validate_phone};
//!
//! assert!(validate_phone("9876543210").is_ok());
//! assert_eq!(format_phone("9876543210"), "+91 98765 43210");
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Medicine;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Contact Validators
// =============================================================================

/// Validates a 10-digit Indian mobile number.
///
/// ## Rules
/// - Exactly 10 ASCII digits
/// - First digit is 6, 7, 8 or 9
///
/// ## Example
/// ```rust
/// use medimart_core::validation::validate_phone;
///
/// assert!(validate_phone("6123456789").is_ok());
/// assert!(validate_phone("5123456789").is_err());
/// assert!(validate_phone("98765").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    required("phone", phone)?;

    let bytes = phone.as_bytes();
    if bytes.len() != 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(invalid("phone", "must be a 10-digit mobile number"));
    }
    if !matches!(bytes[0], b'6'..=b'9') {
        return Err(invalid("phone", "must start with 6, 7, 8 or 9"));
    }

    Ok(())
}

/// Validates a 6-digit postal pincode that does not start with 0.
pub fn validate_pincode(pincode: &str) -> ValidationResult<()> {
    let pincode = pincode.trim();
    required("pincode", pincode)?;

    let bytes = pincode.as_bytes();
    if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_digit) || bytes[0] == b'0' {
        return Err(invalid("pincode", "must be 6 digits and not start with 0"));
    }

    Ok(())
}

/// Validates an email address of the form `local@domain.tld`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    required("email", email)?;

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("email", "must not contain spaces"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    };
    if !valid {
        return Err(invalid("email", "must look like name@example.com"));
    }

    Ok(())
}

/// Validates a person's name: at least 2 characters after trimming.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    required("name", name)?;

    if name.chars().count() < 2 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
    }

    Ok(())
}

/// Validates a UPI id such as `someone@okbank`.
///
/// Both halves may contain letters, digits, `_`, `.` and `-`.
pub fn validate_upi_id(upi: &str) -> ValidationResult<()> {
    let upi = upi.trim();
    required("upi_id", upi)?;

    let allowed = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    };

    match upi.split_once('@') {
        Some((handle, provider)) if allowed(handle) && allowed(provider) => Ok(()),
        _ => Err(invalid("upi_id", "must look like name@bank")),
    }
}

/// Formats a 10-digit number as `+91 XXXXX XXXXX`.
///
/// Anything that is not exactly 10 digits after stripping non-digits is
/// returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("+91 {} {}", &digits[..5], &digits[5..])
}

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a quantity chosen for a cart line.
///
/// ## Rules
/// - At least 1
/// - At most `stock` (the medicine's `stock_quantity`)
pub fn validate_quantity(quantity: i64, stock: i64) -> ValidationResult<()> {
    if quantity < 1 || quantity > stock {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: stock,
        });
    }
    Ok(())
}

/// Validates a review rating: 1 to 5 stars, fractions allowed.
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !(1.0..=5.0).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

/// Checks that `requested` units of `medicine` are in stock.
pub fn check_stock(medicine: &Medicine, requested: i64) -> CoreResult<()> {
    if !medicine.can_hold(requested) {
        return Err(CoreError::InsufficientStock {
            medicine_id: medicine.id.clone(),
            available: medicine.stock_quantity,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
