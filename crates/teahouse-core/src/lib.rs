//! # teahouse-core: Pure Business Logic for Teahouse POS
//!
//! Everything the counter app decides on its own lives here: what a drink
//! costs, what is in the cart, and who is logged in. No I/O of any kind.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Teahouse POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      SPA (menu, cart, admin)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          teahouse-pos (state containers, commands, tokens)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ teahouse-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐   │   │
//! │  │   │  types  │ │ pricing │ │  cart   │ │ voucher │ │ session │   │   │
//! │  │   │ Product │ │ resolve │ │  lines  │ │ discount│ │  JWT →  │   │   │
//! │  │   │ Variant │ │ _price  │ │  totals │ │  caps   │ │ identity│   │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘   │   │
//! │  │                                                                 │   │
//! │  │        NO I/O • NO NETWORK • NO STORAGE • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog types (Product, ProductVariant, Topping, SizeSelection)
//! - [`money`] - Whole-đồng integer money
//! - [`pricing`] - Line price resolution
//! - [`cart`] - Cart lines and totals
//! - [`voucher`] - Percentage discounts
//! - [`session`] - Token decoding and the session state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; the clock is passed in
//! 2. **No I/O**: storage and network belong to `teahouse-pos`
//! 3. **Integer Money**: VND has no minor unit, so amounts are whole đồng (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use teahouse_core::pricing::resolve_price;
//! use teahouse_core::types::{Product, ProductVariant, SizeSelection, Topping};
//!
//! let product = Product {
//!     id: "p1".into(),
//!     name: "Trà sữa trân châu".into(),
//!     price: 30_000.0,
//!     topping_allowed: true,
//!     variants: vec![ProductVariant {
//!         id: "v1".into(),
//!         size_id: "L".into(),
//!         price: 40_000.0,
//!     }],
//!     category_id: None,
//!     is_active: true,
//! };
//! let toppings = [Topping::new("t1", 5_000.0), Topping::new("t2", 7_000.0)];
//!
//! let quote = resolve_price(&product, &SizeSelection::variant("L"), &toppings, 2).unwrap();
//! assert_eq!(quote.total.units(), 104_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod session;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartTotals};
pub use error::{CoreError, PricingError, SessionError, ValidationError};
pub use money::Money;
pub use pricing::{resolve_price, PriceQuote};
pub use session::{materialize_session, SessionIdentity, SessionOutcome, SessionState};
pub use types::*;
pub use voucher::Voucher;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 50;

/// Maximum quantity of a single line.
///
/// Catches fat-finger entries (typing 100 instead of 10) at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 99;
