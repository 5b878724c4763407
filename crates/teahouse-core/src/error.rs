//! # Error Types
//!
//! Domain-specific error types for teahouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  teahouse-core errors (this file)                                      │
//! │  ├── CoreError        - Cart-level failures, wraps the others          │
//! │  ├── PricingError     - Pricing Resolver failures                      │
//! │  ├── SessionError     - Why a bearer token was rejected                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  teahouse-pos errors (app crate)                                       │
//! │  └── ApiError         - What the UI sees (code + message)              │
//! │                                                                         │
//! │  Flow: PricingError → CoreError → ApiError → "block submit" in the UI  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, size id, etc.)
//! 3. Errors are enum variants, never String
//! 4. None of these are retried: they describe bad data or a bad selection

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Failures of the Pricing Resolver.
///
/// ## User Workflow
/// ```text
/// Cashier picks size "L" + pearls, qty 2
///      │
///      ▼
/// resolve_price(...)
///      │
///      ├── size missing      → VariantNotFound  → "Size L is not sold"
///      ├── qty 0 from data   → InvalidQuantity  → "Invalid quantity"
///      ├── price NaN / < 0   → InvalidPrice     → "Price data is corrupt"
///      │
///      ▼
/// Submit button stays disabled until the error is resolved
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A directly supplied quantity below 1.
    #[error("Invalid quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: i64 },

    /// The selected size is not among the product's variants.
    #[error("Product {product_id} has no variant for size {size_id}")]
    VariantNotFound { product_id: String, size_id: String },

    /// A resolved price is NaN, infinite or negative.
    ///
    /// `source_name` names the price that failed, e.g. `product p-1` or
    /// `topping t-3`. `value` is the raw wire value, formatted.
    #[error("Invalid price for {source_name}: {value}")]
    InvalidPrice { source_name: String, value: String },

    /// The total does not fit the money representation.
    #[error("Price for product {product_id} overflows")]
    PriceOverflow { product_id: String },
}

// =============================================================================
// Session Error
// =============================================================================

/// Reasons a bearer token does not yield a session.
///
/// These never reach the user as errors: every variant ends in the
/// anonymous state with the stored token purged. They exist for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The token is not a decodable JWT (wrong shape, bad base64, bad JSON).
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// A claim required for the identity is absent or not a string.
    #[error("Token is missing required claim: {field}")]
    MissingClaim { field: &'static str },

    /// The `exp` claim is in the past.
    #[error("Token expired at {expired_at}")]
    Expired { expired_at: i64 },
}

// =============================================================================
// Core Error
// =============================================================================

/// Cart-level business errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Pricing failed for a line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// No line with this id in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Cart has reached the maximum number of lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A line was re-priced against a different product than it holds.
    #[error("Cart line holds product {expected}, got {actual}")]
    ProductMismatch { expected: String, actual: String },

    /// Product is inactive (soft-deleted) and cannot be ordered.
    #[error("Product {0} is not available for sale")]
    ProductUnavailable(String),

    /// Voucher cannot be applied to this cart.
    #[error("Voucher {code} requires an order of at least {min_order_total}")]
    VoucherNotApplicable { code: String, min_order_total: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid voucher code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with PricingError.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
