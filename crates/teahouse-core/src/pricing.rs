//! # Pricing Resolver
//!
//! Computes the price of one customized cart line.
//!
//! ## Resolution Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    resolve_price(product, size, toppings, qty)          │
//! │                                                                         │
//! │  qty < 1 ?  ──────────────────────────────► InvalidQuantity             │
//! │                                                                         │
//! │  size = Parent        ──► unit base = product.price                     │
//! │  size = Variant(id)   ──► unit base = variant[id].price                 │
//! │                           (missing ──► VariantNotFound)                 │
//! │                                                                         │
//! │  product.topping_allowed ? sum(topping.price) : 0                       │
//! │                                                                         │
//! │  total = (unit base + toppings) × qty                                   │
//! │                                                                         │
//! │  any price NaN / negative ────────────────► InvalidPrice                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure: identical input gives identical output, so
//! quotes can be memoized by callers and compared in tests.
//!
//! ## Example
//! ```rust
//! use teahouse_core::pricing::resolve_price;
//! use teahouse_core::types::{Product, SizeSelection, Topping};
//!
//! let product = Product {
//!     id: "p-1".into(),
//!     name: "Trà sữa".into(),
//!     price: 20000.0,
//!     topping_allowed: true,
//!     variants: vec![],
//!     category_id: None,
//!     is_active: true,
//! };
//! let pearls = Topping::new("t-1", 5000.0);
//!
//! let quote = resolve_price(&product, &SizeSelection::Parent, &[pearls], 2).unwrap();
//! assert_eq!(quote.total.units(), 50_000);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{PricingError, PricingResult};
use crate::money::Money;
use crate::types::{Product, SizeSelection, Topping};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Price Quote
// =============================================================================

/// The resolved price of a cart line, with its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceQuote {
    /// Price of one unit of the chosen size (or master price).
    pub unit_base_price: Money,

    /// Sum of the applied toppings for one unit.
    pub toppings_total: Money,

    /// Quantity the total was computed for.
    pub quantity: u32,

    /// `(unit_base_price + toppings_total) × quantity`.
    pub total: Money,
}

impl PriceQuote {
    /// Price of one unit including toppings.
    pub fn unit_price(&self) -> Money {
        self.unit_base_price + self.toppings_total
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the total price of a customized line.
///
/// ## Errors
/// - [`PricingError::InvalidQuantity`] if `quantity < 1`
/// - [`PricingError::VariantNotFound`] if a variant size is not on the product
/// - [`PricingError::InvalidPrice`] if a used price is NaN, infinite or negative
/// - [`PricingError::PriceOverflow`] if the total does not fit
///
/// Toppings are ignored entirely (neither summed nor validated) when the
/// product does not allow them.
pub fn resolve_price(
    product: &Product,
    size: &SizeSelection,
    toppings: &[Topping],
    quantity: i64,
) -> PricingResult<PriceQuote> {
    if quantity < 1 {
        return Err(PricingError::InvalidQuantity { quantity });
    }
    let quantity = u32::try_from(quantity).map_err(|_| overflow(product))?;

    let unit_base_price = unit_base_price(product, size)?;
    let toppings_total = toppings_total(product, toppings)?;

    let total = unit_base_price
        .checked_add(toppings_total)
        .and_then(|unit| unit.checked_mul_quantity(quantity))
        .ok_or_else(|| overflow(product))?;

    Ok(PriceQuote {
        unit_base_price,
        toppings_total,
        quantity,
        total,
    })
}

/// Resolves the price of one unit of the selected size, toppings excluded.
pub fn unit_base_price(product: &Product, size: &SizeSelection) -> PricingResult<Money> {
    match size {
        SizeSelection::Parent => wire_price(product.price, || format!("product {}", product.id)),
        SizeSelection::Variant { size_id } => {
            let variant =
                product
                    .variant(size_id)
                    .ok_or_else(|| PricingError::VariantNotFound {
                        product_id: product.id.clone(),
                        size_id: size_id.clone(),
                    })?;

            wire_price(variant.price, || {
                format!("variant {} of product {}", variant.id, product.id)
            })
        }
    }
}

/// Sums the topping prices for one unit, or zero if the product takes none.
pub fn toppings_total(product: &Product, toppings: &[Topping]) -> PricingResult<Money> {
    if !product.topping_allowed {
        return Ok(Money::zero());
    }

    toppings.iter().try_fold(Money::zero(), |acc, topping| {
        let price = wire_price(topping.price, || format!("topping {}", topping.product_id))?;
        acc.checked_add(price).ok_or_else(|| overflow(product))
    })
}

/// Applies an increment/decrement from the UI, clamped to `1..=MAX_ITEM_QUANTITY`.
///
/// ## User Workflow
/// ```text
/// [ - ]  1  [ + ]     press "-" at 1  → stays 1 (never 0, never an error)
/// [ - ]  99 [ + ]     press "+" at max → stays at max
/// ```
///
/// ## Example
/// ```rust
/// use teahouse_core::pricing::step_quantity;
///
/// assert_eq!(step_quantity(1, -1), 1);
/// assert_eq!(step_quantity(2, 1), 3);
/// assert_eq!(step_quantity(5, -10), 1);
/// ```
pub fn step_quantity(current: u32, delta: i64) -> u32 {
    let next = (current as i64).saturating_add(delta);
    next.clamp(1, MAX_ITEM_QUANTITY) as u32
}

fn wire_price(amount: f64, source_name: impl FnOnce() -> String) -> PricingResult<Money> {
    Money::from_wire(amount).ok_or_else(|| PricingError::InvalidPrice {
        source_name: source_name(),
        value: amount.to_string(),
    })
}

fn overflow(product: &Product) -> PricingError {
    PricingError::PriceOverflow {
        product_id: product.id.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductVariant;
    use proptest::prelude::*;

    fn product(price: f64, topping_allowed: bool, variants: &[(&str, f64)]) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Trà sữa".to_string(),
            price,
            topping_allowed,
            variants: variants
                .iter()
                .map(|(size, price)| ProductVariant {
                    id: format!("p-1-{}", size),
                    size_id: size.to_string(),
                    price: *price,
                })
                .collect(),
            category_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_parent_price_with_topping_and_quantity() {
        let p = product(20000.0, true, &[]);
        let toppings = [Topping::new("t-1", 5000.0)];

        let quote = resolve_price(&p, &SizeSelection::Parent, &toppings, 2).unwrap();

        assert_eq!(quote.unit_base_price.units(), 20_000);
        assert_eq!(quote.toppings_total.units(), 5_000);
        assert_eq!(quote.unit_price().units(), 25_000);
        assert_eq!(quote.total.units(), 50_000);
    }

    #[test]
    fn test_parent_uses_direct_price_regardless_of_variants() {
        let p = product(30000.0, false, &[("Small", 20000.0), ("Large", 40000.0)]);

        let quote = resolve_price(&p, &SizeSelection::Parent, &[], 1).unwrap();

        assert_eq!(quote.total.units(), 30_000);
    }

    #[test]
    fn test_variant_price_is_used() {
        let p = product(30000.0, true, &[("Small", 20000.0), ("Large", 40000.0)]);

        let quote = resolve_price(&p, &SizeSelection::variant("Large"), &[], 3).unwrap();

        assert_eq!(quote.unit_base_price.units(), 40_000);
        assert_eq!(quote.total.units(), 120_000);
    }

    #[test]
    fn test_missing_variant_is_an_error() {
        let p = product(30000.0, true, &[("Small", 20000.0)]);

        let err = resolve_price(&p, &SizeSelection::variant("Large"), &[], 1).unwrap_err();

        assert_eq!(
            err,
            PricingError::VariantNotFound {
                product_id: "p-1".to_string(),
                size_id: "Large".to_string(),
            }
        );
    }

    #[test]
    fn test_variant_ids_are_case_sensitive() {
        let p = product(30000.0, true, &[("Small", 20000.0)]);
        let err = resolve_price(&p, &SizeSelection::variant("small"), &[], 1).unwrap_err();
        assert!(matches!(err, PricingError::VariantNotFound { .. }));
    }

    #[test]
    fn test_zero_quantity_is_an_error() {
        let p = product(30000.0, true, &[]);

        let err = resolve_price(&p, &SizeSelection::Parent, &[], 0).unwrap_err();
        assert_eq!(err, PricingError::InvalidQuantity { quantity: 0 });

        let err = resolve_price(&p, &SizeSelection::Parent, &[], -3).unwrap_err();
        assert_eq!(err, PricingError::InvalidQuantity { quantity: -3 });
    }

    #[test]
    fn test_toppings_ignored_when_not_allowed() {
        let p = product(25000.0, false, &[]);
        // Even a corrupt topping price is not looked at
        let toppings = [Topping::new("t-1", 5000.0), Topping::new("t-2", f64::NAN)];

        let quote = resolve_price(&p, &SizeSelection::Parent, &toppings, 2).unwrap();

        assert!(quote.toppings_total.is_zero());
        assert_eq!(quote.total.units(), 50_000);
    }

    #[test]
    fn test_nan_base_price_is_invalid() {
        let p = product(f64::NAN, true, &[]);
        let err = resolve_price(&p, &SizeSelection::Parent, &[], 1).unwrap_err();
        assert!(matches!(err, PricingError::InvalidPrice { .. }));
    }

    #[test]
    fn test_negative_variant_price_is_invalid() {
        let p = product(30000.0, true, &[("M", -1.0)]);
        let err = resolve_price(&p, &SizeSelection::variant("M"), &[], 1).unwrap_err();
        match err {
            PricingError::InvalidPrice { source_name, .. } => {
                assert_eq!(source_name, "variant p-1-M of product p-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_topping_price_is_invalid() {
        let p = product(30000.0, true, &[]);
        let toppings = [Topping::new("t-9", -500.0)];
        let err = resolve_price(&p, &SizeSelection::Parent, &toppings, 1).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidPrice {
                source_name: "topping t-9".to_string(),
                value: "-500".to_string(),
            }
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let p = product(9.0e18, true, &[]);
        let err = resolve_price(&p, &SizeSelection::Parent, &[], 2).unwrap_err();
        assert!(matches!(err, PricingError::PriceOverflow { .. }));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let p = product(30000.0, true, &[("L", 38000.0)]);
        let toppings = [Topping::new("t-1", 5000.0), Topping::new("t-2", 7000.0)];
        let size = SizeSelection::variant("L");

        let a = resolve_price(&p, &size, &toppings, 4).unwrap();
        let b = resolve_price(&p, &size, &toppings, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_step_quantity_clamps() {
        assert_eq!(step_quantity(1, -1), 1);
        assert_eq!(step_quantity(3, -1), 2);
        assert_eq!(step_quantity(3, 1), 4);
        assert_eq!(step_quantity(MAX_ITEM_QUANTITY as u32, 1), MAX_ITEM_QUANTITY as u32);
        assert_eq!(step_quantity(1, i64::MIN), 1);
        assert_eq!(step_quantity(1, i64::MAX), MAX_ITEM_QUANTITY as u32);
    }

    proptest! {
        /// total == (base + Σ toppings) × qty, exactly, for valid inputs.
        #[test]
        fn total_matches_formula(
            base in 0i64..1_000_000,
            topping_prices in prop::collection::vec(0i64..100_000, 0..6),
            qty in 1i64..=999,
        ) {
            let p = product(base as f64, true, &[]);
            let toppings: Vec<Topping> = topping_prices
                .iter()
                .enumerate()
                .map(|(i, price)| Topping::new(format!("t-{i}"), *price as f64))
                .collect();

            let quote = resolve_price(&p, &SizeSelection::Parent, &toppings, qty).unwrap();

            let expected = (base + topping_prices.iter().sum::<i64>()) * qty;
            prop_assert_eq!(quote.total.units(), expected);
        }

        /// Disallowed toppings never change the total.
        #[test]
        fn disallowed_toppings_do_not_matter(
            base in 0i64..1_000_000,
            topping_prices in prop::collection::vec(any::<f64>(), 0..6),
            qty in 1i64..=999,
        ) {
            let p = product(base as f64, false, &[]);
            let toppings: Vec<Topping> = topping_prices
                .iter()
                .map(|price| Topping::new("t", *price))
                .collect();

            let with = resolve_price(&p, &SizeSelection::Parent, &toppings, qty).unwrap();
            let without = resolve_price(&p, &SizeSelection::Parent, &[], qty).unwrap();
            prop_assert_eq!(with, without);
        }

        /// Parent selection ignores whatever variants exist.
        #[test]
        fn parent_ignores_variants(
            base in 0i64..1_000_000,
            variant_prices in prop::collection::vec(0i64..1_000_000, 0..4),
        ) {
            let sizes: Vec<(String, f64)> = variant_prices
                .iter()
                .enumerate()
                .map(|(i, price)| (format!("S{i}"), *price as f64))
                .collect();
            let size_refs: Vec<(&str, f64)> =
                sizes.iter().map(|(s, p)| (s.as_str(), *p)).collect();
            let p = product(base as f64, true, &size_refs);

            let quote = resolve_price(&p, &SizeSelection::Parent, &[], 1).unwrap();
            prop_assert_eq!(quote.total.units(), base);
        }

        /// A size id absent from the variants never resolves.
        #[test]
        fn absent_size_never_defaults(size_id in "[A-Za-z]{1,8}") {
            let p = product(30000.0, true, &[("Small", 20000.0)]);
            prop_assume!(size_id != "Small");

            let result = resolve_price(&p, &SizeSelection::variant(size_id), &[], 1);
            let is_variant_not_found = matches!(result, Err(PricingError::VariantNotFound { .. }));
            prop_assert!(is_variant_not_found);
        }
    }
}
