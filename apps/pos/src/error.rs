//! # API Error Type
//!
//! Unified error type for shell commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Teahouse POS                           │
//! │                                                                         │
//! │  SPA                         Rust Shell                                 │
//! │  ───                         ──────────                                 │
//! │                                                                         │
//! │  add_to_cart(...)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Pricing Error? ─── PricingError::VariantNotFound ──┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Cart Error? ─────── CoreError::LineNotFound ────── ApiError ──►│  │
//! │  │         │                                           ▲           │  │
//! │  │         ▼                                           │           │  │
//! │  │  Session? ────────── SessionError::MissingClaim ────┘           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    // e.code = "VARIANT_NOT_FOUND"                                      │
//! │    // e.message = "Product p-1 has no variant for size L"               │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use teahouse_core::{CoreError, Money, PricingError, SessionError, ValidationError};

/// Error returned from shell commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INVALID_QUANTITY",
///   "message": "Invalid quantity 0: must be at least 1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (cart line, product)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Quantity below 1 supplied directly
    InvalidQuantity,

    /// Selected size is not sold for the product
    VariantNotFound,

    /// Catalog price data is corrupt
    InvalidPrice,

    /// Business rule refused the action (inactive product, voucher minimum)
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// No valid session; the UI should redirect to login
    Unauthorized,

    /// Session role does not match the route
    Forbidden,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }
}

/// Converts pricing errors to API errors.
impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        let code = match &err {
            PricingError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            PricingError::VariantNotFound { .. } => ErrorCode::VariantNotFound,
            PricingError::InvalidPrice { .. } => {
                tracing::error!(error = %err, "Corrupt catalog price");
                ErrorCode::InvalidPrice
            }
            PricingError::PriceOverflow { .. } => ErrorCode::InvalidPrice,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Pricing(e) => e.into(),
            CoreError::LineNotFound(id) => ApiError::not_found("Cart line", &id),
            CoreError::CartTooLarge { max } => {
                ApiError::cart(format!("Cart cannot have more than {} lines", max))
            }
            e @ CoreError::ProductMismatch { .. } => ApiError::validation(e.to_string()),
            e @ CoreError::ProductUnavailable(_) => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
            CoreError::VoucherNotApplicable {
                code,
                min_order_total,
            } => ApiError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "Voucher {} requires an order of at least {}",
                    code,
                    Money::from_units(min_order_total)
                ),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
