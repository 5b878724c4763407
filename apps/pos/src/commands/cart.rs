//! # Cart Commands
//!
//! Commands for building an order at the counter.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Voucher  │────►│ Checkout │       │
//! │  │  Cart    │     │          │     │ applied  │     │ (REST)   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   add_to_cart                                           │
//! │                   increment / decrement                                 │
//! │                   change_line_size / replace_line_toppings              │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►  (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use teahouse_core::cart::SubtotalDrift;
use teahouse_core::validation::{validate_discount_bps, validate_line_id, validate_voucher_code};
use teahouse_core::{
    Cart, CartLineItem, CartTotals, Money, Product, SizeSelection, Topping, Voucher,
};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::CartState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// A cart line plus its derived prices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLineItem,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        CartLineView {
            line: line.clone(),
            unit_price: line.quote().unit_price(),
            subtotal: line.subtotal(),
        }
    }
}

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineView>,
    pub voucher: Option<Voucher>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            voucher: cart.voucher().cloned(),
            totals: cart.totals(),
        }
    }
}

/// A drink as configured on the order screen.
///
/// `size` is preferred; `sizeId` is accepted for payloads in the legacy
/// string form. With neither, the product's default size is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product: Product,
    #[serde(default)]
    pub size: Option<SizeSelection>,
    #[serde(default)]
    pub size_id: Option<String>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl LineRequest {
    pub fn selection(&self) -> SizeSelection {
        self.size
            .clone()
            .or_else(|| self.size_id.as_deref().map(SizeSelection::from_legacy))
            .unwrap_or_else(|| self.product.default_size())
    }

    pub fn build(&self) -> Result<CartLineItem, ApiError> {
        let line = CartLineItem::build(
            &self.product,
            self.selection(),
            &self.toppings,
            self.quantity.unwrap_or(1),
        )?;
        Ok(line)
    }
}

/// A cached `subPrice` from a cart row the backend returned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSubtotal {
    pub line_id: String,
    pub sub_price: f64,
}

// =============================================================================
// Commands
// =============================================================================

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a configured drink to the cart.
///
/// ## Behavior
/// - Same product, size and toppings already in cart: quantities merge
/// - Otherwise: added as a new line
/// - Unit prices are resolved now and kept with the line
pub fn add_to_cart(cart: &CartState, request: LineRequest) -> Result<CartResponse, ApiError> {
    debug!(
        product_id = %request.product.id,
        size = %request.selection(),
        toppings = request.toppings.len(),
        "add_to_cart command"
    );

    let line = request.build()?;
    cart.with_cart_mut(|c| {
        c.add_line(line)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Handles the [+] button. Clamps at the maximum quantity.
pub fn increment_cart_item(cart: &CartState, line_id: &str) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "increment_cart_item command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.increment_line(line_id)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Handles the [-] button. Never goes below 1; removal is explicit.
pub fn decrement_cart_item(cart: &CartState, line_id: &str) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "decrement_cart_item command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.decrement_line(line_id)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Sets a line quantity typed by the cashier.
///
/// Quantities below 1 are rejected with `INVALID_QUANTITY`.
pub fn update_cart_item(
    cart: &CartState,
    line_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, quantity, "update_cart_item command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.update_quantity(line_id, quantity)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Switches a line to another size and re-prices it.
pub fn change_line_size(
    cart: &CartState,
    line_id: &str,
    product: &Product,
    size: SizeSelection,
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, size = %size, "change_line_size command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.line_mut(line_id)?.change_size(product, size)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Replaces a line's toppings and re-prices it.
pub fn replace_line_toppings(
    cart: &CartState,
    line_id: &str,
    product: &Product,
    toppings: &[Topping],
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, toppings = toppings.len(), "replace_line_toppings command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.line_mut(line_id)?.replace_toppings(product, toppings)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Removes a line from the cart.
pub fn remove_from_cart(cart: &CartState, line_id: &str) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "remove_from_cart command");
    validate_line_id(line_id)?;

    cart.with_cart_mut(|c| {
        c.remove_line(line_id)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Clears all lines and the voucher.
///
/// ## When Used
/// - Cashier cancels the order
/// - After checkout succeeds
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

/// Applies a voucher the backend looked up for the typed code.
pub fn apply_voucher(cart: &CartState, voucher: Voucher) -> Result<CartResponse, ApiError> {
    debug!(code = %voucher.code, "apply_voucher command");

    cart.with_cart_mut(|c| {
        redeem_voucher(c, voucher)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Normalizes the voucher code, checks the discount and attaches it.
pub(crate) fn redeem_voucher(cart: &mut Cart, mut voucher: Voucher) -> Result<(), ApiError> {
    voucher.code = validate_voucher_code(&voucher.code)?;
    validate_discount_bps(voucher.discount_bps)?;
    cart.apply_voucher(voucher)?;
    Ok(())
}

pub fn remove_voucher(cart: &CartState) -> CartResponse {
    debug!("remove_voucher command");

    cart.with_cart_mut(|c| {
        c.remove_voucher();
        CartResponse::from(&*c)
    })
}

/// Compares cached `subPrice` values from the backend with the derived
/// subtotals. Drift is logged; the derived value is what the cart shows.
///
/// Rows for lines not in the local cart are skipped.
pub fn reconcile_remote_cart(cart: &CartState, rows: &[RemoteSubtotal]) -> Vec<SubtotalDrift> {
    let drifts: Vec<SubtotalDrift> = cart.with_cart(|c| {
        rows.iter()
            .filter_map(|row| c.line(&row.line_id)?.detect_drift(row.sub_price))
            .collect()
    });

    for drift in &drifts {
        warn!(
            line_id = %drift.line_id,
            cached = drift.cached,
            actual = %drift.actual,
            "Cached subtotal disagrees with computed subtotal"
        );
    }
    if drifts.is_empty() {
        debug!(rows = rows.len(), "Remote cart subtotals agree");
    } else {
        info!(drifted = drifts.len(), "Using computed subtotals");
    }

    drifts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use teahouse_core::ProductVariant;

    fn tea() -> Product {
        Product {
            id: "tea".into(),
            name: "Trà sữa".into(),
            price: 30_000.0,
            topping_allowed: true,
            variants: vec![
                ProductVariant {
                    id: "tea-m".into(),
                    size_id: "M".into(),
                    price: 20_000.0,
                },
                ProductVariant {
                    id: "tea-l".into(),
                    size_id: "L".into(),
                    price: 25_000.0,
                },
            ],
            category_id: None,
            is_active: true,
        }
    }

    fn request(size: SizeSelection, toppings: Vec<Topping>, quantity: i64) -> LineRequest {
        LineRequest {
            product: tea(),
            size: Some(size),
            size_id: None,
            toppings,
            quantity: Some(quantity),
        }
    }

    fn only_line_id(response: &CartResponse) -> String {
        response.lines[0].line.line_id().to_string()
    }

    #[test]
    fn test_add_to_cart_prices_line() {
        let cart = CartState::new();

        let response = add_to_cart(
            &cart,
            request(SizeSelection::variant("M"), vec![Topping::new("pearl", 5_000.0)], 2),
        )
        .unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].unit_price.units(), 25_000);
        assert_eq!(response.lines[0].subtotal.units(), 50_000);
        assert_eq!(response.totals.total.units(), 50_000);
    }

    #[test]
    fn test_add_same_configuration_merges() {
        let cart = CartState::new();
        add_to_cart(&cart, request(SizeSelection::variant("L"), vec![], 1)).unwrap();
        let response = add_to_cart(&cart, request(SizeSelection::variant("L"), vec![], 2)).unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.totals.total_quantity, 3);
    }

    #[test]
    fn test_add_unknown_size_fails() {
        let cart = CartState::new();
        let err = add_to_cart(&cart, request(SizeSelection::variant("XL"), vec![], 1)).unwrap_err();

        assert_eq!(err.code, ErrorCode::VariantNotFound);
        assert!(get_cart(&cart).lines.is_empty());
    }

    #[test]
    fn test_legacy_size_id_and_default_size() {
        let mut legacy = request(SizeSelection::Parent, vec![], 1);
        legacy.size = None;
        legacy.size_id = Some("Parent".into());
        assert_eq!(legacy.selection(), SizeSelection::Parent);

        legacy.size_id = None;
        assert_eq!(legacy.selection(), SizeSelection::variant("M"));
    }

    #[test]
    fn test_line_request_from_json() {
        let json = r#"{
            "product": {"id":"tea","name":"Trà sữa","price":30000,"toppingAllowed":false,"variants":[]},
            "sizeId": "Parent",
            "quantity": 3
        }"#;
        let req: LineRequest = serde_json::from_str(json).unwrap();
        let line = req.build().unwrap();

        assert_eq!(line.subtotal().units(), 90_000);
    }

    #[test]
    fn test_increment_decrement_clamp() {
        let cart = CartState::new();
        let response = add_to_cart(&cart, request(SizeSelection::Parent, vec![], 1)).unwrap();
        let id = only_line_id(&response);

        let response = decrement_cart_item(&cart, &id).unwrap();
        assert_eq!(response.totals.total_quantity, 1);

        let response = increment_cart_item(&cart, &id).unwrap();
        assert_eq!(response.totals.total_quantity, 2);
        assert_eq!(response.totals.subtotal.units(), 60_000);
    }

    #[test]
    fn test_update_quantity_zero_is_invalid() {
        let cart = CartState::new();
        let id = only_line_id(&add_to_cart(&cart, request(SizeSelection::Parent, vec![], 1)).unwrap());

        let err = update_cart_item(&cart, &id, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
    }

    #[test]
    fn test_bad_line_id() {
        let cart = CartState::new();

        let err = remove_from_cart(&cart, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = remove_from_cart(&cart, "550e8400-e29b-41d4-a716-446655440000").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_change_size_and_toppings_reprice() {
        let cart = CartState::new();
        let id = only_line_id(&add_to_cart(&cart, request(SizeSelection::variant("M"), vec![], 2)).unwrap());

        let response = change_line_size(&cart, &id, &tea(), SizeSelection::variant("L")).unwrap();
        assert_eq!(response.totals.subtotal.units(), 50_000);

        let response =
            replace_line_toppings(&cart, &id, &tea(), &[Topping::new("jelly", 7_000.0)]).unwrap();
        assert_eq!(response.totals.subtotal.units(), 64_000);
    }

    #[test]
    fn test_voucher_flow() {
        let cart = CartState::new();
        add_to_cart(&cart, request(SizeSelection::Parent, vec![], 4)).unwrap();

        let voucher = Voucher {
            code: " tra10 ".into(),
            discount_bps: 1_000,
            max_discount: None,
            min_order_total: Some(Money::from_units(100_000)),
        };
        let response = apply_voucher(&cart, voucher).unwrap();

        assert_eq!(response.voucher.as_ref().map(|v| v.code.as_str()), Some("TRA10"));
        assert_eq!(response.totals.discount.units(), 12_000);
        assert_eq!(response.totals.total.units(), 108_000);

        let response = remove_voucher(&cart);
        assert_eq!(response.totals.total.units(), 120_000);
    }

    #[test]
    fn test_voucher_below_minimum_rejected() {
        let cart = CartState::new();
        add_to_cart(&cart, request(SizeSelection::Parent, vec![], 1)).unwrap();

        let voucher = Voucher {
            code: "BIG".into(),
            discount_bps: 1_000,
            max_discount: None,
            min_order_total: Some(Money::from_units(100_000)),
        };
        let err = apply_voucher(&cart, voucher).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_reconcile_detects_drift() {
        let cart = CartState::new();
        let id = only_line_id(&add_to_cart(&cart, request(SizeSelection::variant("M"), vec![], 2)).unwrap());

        let agree = reconcile_remote_cart(
            &cart,
            &[RemoteSubtotal {
                line_id: id.clone(),
                sub_price: 40_000.0,
            }],
        );
        assert!(agree.is_empty());

        let drift = reconcile_remote_cart(
            &cart,
            &[
                RemoteSubtotal {
                    line_id: id.clone(),
                    sub_price: 38_000.0,
                },
                RemoteSubtotal {
                    line_id: "unknown".into(),
                    sub_price: 1.0,
                },
            ],
        );
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].actual.units(), 40_000);
    }

    #[test]
    fn test_clear_cart() {
        let cart = CartState::new();
        add_to_cart(&cart, request(SizeSelection::Parent, vec![], 1)).unwrap();

        let response = clear_cart(&cart);
        assert!(response.lines.is_empty());
        assert!(response.totals.total.is_zero());
    }
}
