//! # Commands Module
//!
//! Every operation the UI layer can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── cart.rs     ◄─── Cart manipulation, vouchers, remote reconciliation
//! ├── quote.rs    ◄─── Price a whole order without the live cart
//! └── session.rs  ◄─── Login/logout, route guards, 401 handling
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> CartResponse
//!
//! // Needs session and config
//! fn handle_api_status(auth: &AuthState, config: &PosConfig, status: u16) -> ApiReaction
//!
//! // Needs nothing shared
//! fn quote_order(request: QuoteRequest) -> Result<CartResponse, ApiError>
//! ```
//!
//! Commands return `Result<T, ApiError>`; the UI receives
//! `{ code, message }` on failure.

pub mod cart;
pub mod quote;
pub mod session;
