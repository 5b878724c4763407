//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The REST API sends prices as JSON numbers:                             │
//! │    { "price": 25000 }   → parsed by the browser as a float             │
//! │                                                                         │
//! │  Summing floats across toppings and quantities drifts:                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Whole currency units (VND has no minor unit)            │
//! │    Convert ONCE at the boundary with `Money::from_wire`, then do       │
//! │    every sum and product in i64.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use teahouse_core::money::Money;
//!
//! let tea = Money::from_units(25_000);
//! let pearls = Money::from_units(5_000);
//!
//! let line = (tea + pearls) * 2;
//! assert_eq!(line.units(), 60_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (1 VND).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts are computed as differences and may go
///   negative transiently; prices accepted from the wire never are.
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized transparently**: `{"total": 50000}` on the wire
///
/// ## Where Money Flows
/// ```text
/// Product.price / Variant.price ──► PriceQuote.unit_base_price ──┐
///                                                               ├──► line subtotal
/// Topping.price ────────────────► PriceQuote.toppings_total ────┘
///
/// Cart subtotal ──► Voucher discount ──► Cart total ──► checkout payload
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    ///
    /// let price = Money::from_units(30_000);
    /// assert_eq!(price.units(), 30_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Converts a JSON number received from the REST API.
    ///
    /// This is the only float entry point. Returns `None` for NaN,
    /// infinities, negative amounts, and values outside the i64 range.
    /// Fractional amounts are rounded to the nearest unit.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    ///
    /// assert_eq!(Money::from_wire(20000.0), Some(Money::from_units(20_000)));
    /// assert_eq!(Money::from_wire(f64::NAN), None);
    /// assert_eq!(Money::from_wire(-1.0), None);
    /// ```
    pub fn from_wire(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }

        let rounded = amount.round();
        // i64::MAX is not exactly representable; stay strictly below 2^63
        if rounded >= 9_223_372_036_854_775_808.0 {
            return None;
        }

        Some(Money(rounded as i64))
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Addition that reports overflow instead of wrapping or panicking.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Multiplies by a quantity, reporting overflow.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    ///
    /// let unit = Money::from_units(25_000);
    /// assert_eq!(unit.checked_mul_quantity(3), Some(Money::from_units(75_000)));
    /// assert_eq!(Money::from_units(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: u32) -> Option<Money> {
        match self.0.checked_mul(qty as i64) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Returns `bps` basis points of this amount, rounded half up.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    ///
    /// let subtotal = Money::from_units(45_000);
    /// // 15% of 45,000 = 6,750
    /// assert_eq!(subtotal.basis_points(1_500).units(), 6_750);
    /// ```
    pub fn basis_points(&self, bps: u32) -> Money {
        // i128 keeps large subtotals from overflowing mid-calculation
        let part = (self.0 as i128 * bps as i128 + 5_000) / 10_000;
        Money(part as i64)
    }

    /// Formats the amount with a thousands separator, no symbol.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1_250_000).grouped('.'), "1.250.000");
    /// assert_eq!(Money::from_units(-5_000).grouped(','), "-5,000");
    /// ```
    pub fn grouped(&self, separator: char) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

        if self.0 < 0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(separator);
            }
            out.push(ch);
        }
        out
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Vietnamese display format: `50.000₫`.
///
/// ## Note
/// This is for logs and the quote CLI. The SPA formats with its own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}₫", self.grouped('.'))
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

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
