//! # Vouchers
//!
//! Percentage vouchers redeemed at checkout.
//!
//! ```text
//! subtotal 120.000₫, voucher 15% capped at 15.000₫, min order 100.000₫
//!
//!   15% of 120.000 = 18.000 ──► cap ──► 15.000₫ discount
//!   total = 105.000₫
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// A discount code as the voucher endpoint returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Voucher {
    /// Code typed by the cashier (stored uppercase).
    pub code: String,

    /// Discount in basis points (1500 = 15%).
    pub discount_bps: u32,

    /// Upper bound of the discount, if any.
    #[serde(default)]
    pub max_discount: Option<Money>,

    /// Smallest subtotal the voucher applies to, if any.
    #[serde(default)]
    pub min_order_total: Option<Money>,
}

impl Voucher {
    /// Whether the voucher applies to a cart with this subtotal.
    pub fn is_applicable(&self, subtotal: Money) -> bool {
        match self.min_order_total {
            Some(min) => subtotal >= min,
            None => true,
        }
    }

    /// The discount granted on `subtotal`.
    ///
    /// Zero when the minimum order is not met. Never more than
    /// `max_discount`, and never more than the subtotal itself.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::money::Money;
    /// use teahouse_core::voucher::Voucher;
    ///
    /// let voucher = Voucher {
    ///     code: "TRASUA15".into(),
    ///     discount_bps: 1_500,
    ///     max_discount: Some(Money::from_units(15_000)),
    ///     min_order_total: None,
    /// };
    ///
    /// assert_eq!(voucher.discount_for(Money::from_units(60_000)).units(), 9_000);
    /// assert_eq!(voucher.discount_for(Money::from_units(200_000)).units(), 15_000);
    /// ```
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if subtotal.is_negative() || !self.is_applicable(subtotal) {
            return Money::zero();
        }

        let mut discount = subtotal.basis_points(self.discount_bps);
        if let Some(cap) = self.max_discount {
            discount = discount.min(cap);
        }
        discount.min(subtotal)
    }
}
