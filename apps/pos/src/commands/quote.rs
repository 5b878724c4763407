//! # Quote Command
//!
//! Prices a whole order without touching the live cart. Backs the
//! `teahouse-pos quote` CLI and order previews.

use serde::Deserialize;
use teahouse_core::{Cart, Voucher};
use tracing::debug;

use super::cart::{redeem_voucher, CartResponse, LineRequest};
use crate::error::ApiError;

/// An order to price.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub lines: Vec<LineRequest>,
    #[serde(default)]
    pub voucher: Option<Voucher>,
}

/// Prices an order through the same rules as the live cart.
///
/// Fails on the first line that does not price.
pub fn quote_order(request: QuoteRequest) -> Result<CartResponse, ApiError> {
    debug!(lines = request.lines.len(), "quote_order command");

    let mut cart = Cart::new();
    for line in &request.lines {
        cart.add_line(line.build()?)?;
    }

    if let Some(voucher) = request.voucher {
        redeem_voucher(&mut cart, voucher)?;
    }

    Ok(CartResponse::from(&cart))
}
