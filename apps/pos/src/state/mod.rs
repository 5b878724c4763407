//! # State Module
//!
//! Application state for the POS shell.
//!
//! Instead of a single `AppState` struct containing everything, each concern
//! gets its own state type and commands take only the ones they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────┐      │
//! │  │  CartState   │  │      AuthState       │  │    PosConfig     │      │
//! │  │              │  │                      │  │                  │      │
//! │  │  Arc<Mutex<  │  │  Arc<Mutex<          │  │  api_base_url    │      │
//! │  │    Cart      │  │    SessionState>>    │  │  login_path      │      │
//! │  │  >>          │  │  Arc<dyn TokenStore> │  │  store_name      │      │
//! │  └──────────────┘  └──────────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: Arc<Mutex<T>> for exclusive access                       │
//! │  • AuthState: Arc<Mutex<T>>; token I/O happens under the same lock     │
//! │  • PosConfig: Read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod session;
mod token_store;

pub use cart::CartState;
pub use config::{ConfigError, PosConfig};
pub use session::AuthState;
pub use token_store::{
    FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_STORAGE_KEY,
};
