//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend sends prices as JSON numbers:                              │
//! │    299.99 + 0.01 = 300.00000000000006  ❌ misses the ₹300 threshold     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    29999 paise + 1 paisa = 30000 paise  ✅ exactly ₹300.00              │
//! │                                                                         │
//! │  Floats are converted ONCE, at the serde boundary, rounding to the      │
//! │  nearest paisa. Every comparison and sum after that is integer math.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medimart_core::money::Money;
//!
//! let price = Money::from_paise(4550);        // ₹45.50
//! let line = price * 3;                        // ₹136.50
//! let total = line + Money::from_rupees(40);   // ₹176.50
//! assert_eq!(total.paise(), 17650);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount held in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts can go negative when a live MRP drops below
///   the price captured in the cart
/// - **Wire format**: a JSON number in rupees (`45.5`), matching the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use medimart_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(500).paise(), 50000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part should be negative:
    /// `from_major_minor(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_major_minor(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Converts a rupee amount received as a float, rounding to the nearest
    /// paisa. Returns `None` for NaN and infinities.
    ///
    /// ## Example
    /// ```rust
    /// use medimart_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees_f64(299.99), Some(Money::from_paise(29999)));
    /// assert_eq!(Money::from_rupees_f64(f64::NAN), None);
    /// ```
    pub fn from_rupees_f64(rupees: f64) -> Option<Self> {
        if !rupees.is_finite() {
            return None;
        }
        Some(Money((rupees * 100.0).round() as i64))
    }

    /// Returns the value as a float in rupees (wire format only).
    #[inline]
    pub fn to_rupees_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the amount, or zero if it is negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use medimart_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(4550);
    /// assert_eq!(unit_price.multiply_quantity(2).paise(), 9100);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount as `₹123.45` (`-₹5.50` for negatives).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_rupees_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        Money::from_rupees_f64(rupees)
            .ok_or_else(|| D::Error::custom(format!("invalid rupee amount: {}", rupees)))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
