//! # Cart
//!
//! Cart lines built on the Pricing Resolver, and the cart that holds them.
//!
//! ## Derived Subtotals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartLineItem                                         │
//! │                                                                         │
//! │   canonical inputs (private)           derived (computed on read)       │
//! │   ─────────────────────────            ───────────────────────────      │
//! │   size ──────────────┐                                                  │
//! │   unit_base_price ───┼──────────────►  subtotal()                       │
//! │   toppings ──────────┤                 = (base + Σ toppings) × qty      │
//! │   quantity ──────────┘                                                  │
//! │                                                                         │
//! │   Inputs only change through methods that re-resolve prices, so the    │
//! │   subtotal can never drift from its formula. A `subPrice` from the      │
//! │   REST cart is a cache: compare it with `detect_drift`, never trust it. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart Operations Flow
//! ```text
//! Order modal "Add" ─────► Cart::add_line ──────► merge or push
//! [ + ] / [ - ] ─────────► increment_line / decrement_line (clamped)
//! Quantity typed in ─────► update_quantity (validated)
//! Trash icon ────────────► remove_line
//! Voucher field ─────────► apply_voucher
//! Checkout ──────────────► totals()
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, PricingError};
use crate::money::Money;
use crate::pricing::{resolve_price, step_quantity, PriceQuote};
use crate::types::{Product, SizeSelection, Topping};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::voucher::Voucher;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Applied Topping
// =============================================================================

/// A topping on a cart line, with its price already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedTopping {
    pub product_id: String,
    pub name: Option<String>,
    pub price: Money,
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One customized drink in the cart.
///
/// ## Invariants
/// - `quantity` is within `1..=MAX_ITEM_QUANTITY`
/// - `toppings` is empty when the product does not allow toppings
/// - the unit price times `MAX_CART_LINES × MAX_ITEM_QUANTITY` fits in
///   [`Money`], so neither `subtotal()` nor a full cart can overflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    line_id: String,
    product_id: String,
    product_name: String,
    size: SizeSelection,
    unit_base_price: Money,
    toppings: Vec<AppliedTopping>,
    quantity: u32,
}

impl CartLineItem {
    /// Builds a line from catalog data and the cashier's choices.
    ///
    /// Toppings are dropped (not priced, not kept) if the product does not
    /// allow them.
    ///
    /// ## Errors
    /// - `ProductUnavailable` for inactive products
    /// - any [`PricingError`] from the resolver
    /// - `Validation` if `quantity` exceeds `MAX_ITEM_QUANTITY`
    pub fn build(
        product: &Product,
        size: SizeSelection,
        toppings: &[Topping],
        quantity: i64,
    ) -> CoreResult<Self> {
        if !product.is_active {
            return Err(CoreError::ProductUnavailable(product.id.clone()));
        }

        // Below 1 is left to the resolver so it reports InvalidQuantity
        if quantity > MAX_ITEM_QUANTITY {
            validate_quantity(quantity)?;
        }
        let quote = resolve_price(product, &size, toppings, quantity)?;
        ensure_headroom(product, &quote)?;

        Ok(CartLineItem {
            line_id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            size,
            unit_base_price: quote.unit_base_price,
            toppings: applied_toppings(product, toppings),
            quantity: quote.quantity,
        })
    }

    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn size(&self) -> &SizeSelection {
        &self.size
    }

    pub fn toppings(&self) -> &[AppliedTopping] {
        &self.toppings
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_base_price(&self) -> Money {
        self.unit_base_price
    }

    /// Sum of topping prices for one unit.
    pub fn toppings_total(&self) -> Money {
        self.toppings.iter().map(|t| t.price).sum()
    }

    /// `(unit_base_price + Σ toppings) × quantity`, computed on every call.
    pub fn subtotal(&self) -> Money {
        (self.unit_base_price + self.toppings_total()) * self.quantity
    }

    /// The line's price breakdown.
    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            unit_base_price: self.unit_base_price,
            toppings_total: self.toppings_total(),
            quantity: self.quantity,
            total: self.subtotal(),
        }
    }

    /// [ + ] button. Stops at `MAX_ITEM_QUANTITY`.
    pub fn increment(&mut self) {
        self.quantity = step_quantity(self.quantity, 1);
    }

    /// [ - ] button. Stops at 1.
    pub fn decrement(&mut self) {
        self.quantity = step_quantity(self.quantity, -1);
    }

    /// Sets a quantity typed in or received from the API.
    ///
    /// Below 1 is `InvalidQuantity`; above the maximum is a validation error.
    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(PricingError::InvalidQuantity { quantity }.into());
        }
        validate_quantity(quantity)?;
        self.quantity = quantity as u32;
        Ok(())
    }

    /// Switches size and re-resolves the base price.
    ///
    /// The line is left untouched on error.
    pub fn change_size(&mut self, product: &Product, size: SizeSelection) -> CoreResult<()> {
        self.ensure_same_product(product)?;

        let toppings = self.topping_inputs();
        let quote = resolve_price(product, &size, &toppings, self.quantity as i64)?;
        ensure_headroom(product, &quote)?;

        self.size = size;
        self.unit_base_price = quote.unit_base_price;
        self.toppings = applied_toppings(product, &toppings);
        Ok(())
    }

    /// Replaces the toppings and re-resolves their prices.
    ///
    /// The line is left untouched on error.
    pub fn replace_toppings(&mut self, product: &Product, toppings: &[Topping]) -> CoreResult<()> {
        self.ensure_same_product(product)?;

        let quote = resolve_price(product, &self.size, toppings, self.quantity as i64)?;
        ensure_headroom(product, &quote)?;

        self.unit_base_price = quote.unit_base_price;
        self.toppings = applied_toppings(product, toppings);
        Ok(())
    }

    /// Whether two lines describe the same drink at the same prices
    /// (product, size, base price and the same priced toppings in any
    /// order), so they can be merged.
    pub fn same_configuration(&self, other: &CartLineItem) -> bool {
        self.product_id == other.product_id
            && self.size == other.size
            && self.unit_base_price == other.unit_base_price
            && self.topping_keys() == other.topping_keys()
    }

    /// Compares a cached subtotal (e.g. `subPrice` from the REST cart) with
    /// the derived one.
    ///
    /// Returns `None` when they agree.
    pub fn detect_drift(&self, cached_subtotal: f64) -> Option<SubtotalDrift> {
        let actual = self.subtotal();
        match Money::from_wire(cached_subtotal) {
            Some(cached) if cached == actual => None,
            _ => Some(SubtotalDrift {
                line_id: self.line_id.clone(),
                cached: cached_subtotal,
                actual,
            }),
        }
    }

    fn topping_keys(&self) -> Vec<(&str, Money)> {
        let mut keys: Vec<(&str, Money)> = self
            .toppings
            .iter()
            .map(|t| (t.product_id.as_str(), t.price))
            .collect();
        keys.sort_unstable();
        keys
    }

    fn topping_inputs(&self) -> Vec<Topping> {
        self.toppings
            .iter()
            .map(|t| Topping {
                product_id: t.product_id.clone(),
                name: t.name.clone(),
                price: t.price.units() as f64,
            })
            .collect()
    }

    fn ensure_same_product(&self, product: &Product) -> CoreResult<()> {
        if product.id != self.product_id {
            return Err(CoreError::ProductMismatch {
                expected: self.product_id.clone(),
                actual: product.id.clone(),
            });
        }
        Ok(())
    }
}

/// A cached subtotal that disagrees with the derived one.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtotalDrift {
    pub line_id: String,
    pub cached: f64,
    pub actual: Money,
}

fn applied_toppings(product: &Product, toppings: &[Topping]) -> Vec<AppliedTopping> {
    if !product.topping_allowed {
        return Vec::new();
    }

    toppings
        .iter()
        .filter_map(|t| {
            // Prices were validated by resolve_price before we get here
            Money::from_wire(t.price).map(|price| AppliedTopping {
                product_id: t.product_id.clone(),
                name: t.name.clone(),
                price,
            })
        })
        .collect()
}

/// Most drinks a cart can hold: every line at the maximum quantity.
const MAX_CART_UNITS: u32 = MAX_CART_LINES as u32 * MAX_ITEM_QUANTITY as u32;

/// Rejects unit prices that could overflow a full cart, so `subtotal()` and
/// `Cart::subtotal()` can use plain arithmetic.
fn ensure_headroom(product: &Product, quote: &PriceQuote) -> CoreResult<()> {
    quote
        .unit_price()
        .checked_mul_quantity(MAX_CART_UNITS)
        .map(|_| ())
        .ok_or_else(|| {
            PricingError::PriceOverflow {
                product_id: product.id.clone(),
            }
            .into()
        })
}

// =============================================================================
// Cart
// =============================================================================

/// The order being built at the counter.
///
/// ## Invariants
/// - At most `MAX_CART_LINES` lines
/// - No two lines share the same configuration (they are merged)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLineItem>,
    voucher: Option<Voucher>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLineItem> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn voucher(&self) -> Option<&Voucher> {
        self.voucher.as_ref()
    }

    /// Adds a line, merging it into an identical one if present.
    ///
    /// Returns the id of the line that now holds the item.
    pub fn add_line(&mut self, line: CartLineItem) -> CoreResult<String> {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_configuration(&line)) {
            let merged = existing.quantity as i64 + line.quantity as i64;
            validate_quantity(merged)?;
            existing.quantity = merged as u32;
            return Ok(existing.line_id.clone());
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        })?;

        let id = line.line_id.clone();
        self.lines.push(line);
        Ok(id)
    }

    /// Removes a line by id.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<CartLineItem> {
        let index = self
            .lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Sets a line's quantity from direct input.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        self.line_mut(line_id)?.set_quantity(quantity)
    }

    pub fn increment_line(&mut self, line_id: &str) -> CoreResult<()> {
        self.line_mut(line_id)?.increment();
        Ok(())
    }

    pub fn decrement_line(&mut self, line_id: &str) -> CoreResult<()> {
        self.line_mut(line_id)?.decrement();
        Ok(())
    }

    /// Gives mutable access to one line for size/topping changes.
    pub fn line_mut(&mut self, line_id: &str) -> CoreResult<&mut CartLineItem> {
        self.lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }

    /// Attaches a voucher if the current subtotal qualifies.
    pub fn apply_voucher(&mut self, voucher: Voucher) -> CoreResult<()> {
        if !voucher.is_applicable(self.subtotal()) {
            return Err(CoreError::VoucherNotApplicable {
                code: voucher.code.clone(),
                min_order_total: voucher.min_order_total.map(|m| m.units()).unwrap_or(0),
            });
        }
        self.voucher = Some(voucher);
        Ok(())
    }

    pub fn remove_voucher(&mut self) -> Option<Voucher> {
        self.voucher.take()
    }

    /// Empties the cart, voucher included.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.voucher = None;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of drinks across lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line subtotals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLineItem::subtotal).sum()
    }

    /// Everything the checkout screen shows.
    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        let discount = self
            .voucher
            .as_ref()
            .map(|v| v.discount_for(subtotal))
            .unwrap_or_default();

        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.total_quantity(),
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}

/// Cart totals summary for the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: u32,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
