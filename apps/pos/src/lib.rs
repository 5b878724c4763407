//! # Teahouse POS Library
//!
//! Application shell for the Teahouse POS: configuration, logging, state
//! containers and the commands the UI invokes. All pricing and session
//! rules live in `teahouse-core`.
//!
//! ## Module Organization
//! ```text
//! teahouse_pos_lib/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── api.rs          ◄─── Authorization header, HTTP status classification
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Cart state (Arc<Mutex<Cart>>)
//! │   ├── session.rs  ◄─── Session state + token effects
//! │   ├── token_store.rs ◄─ Token persistence (memory / JSON file)
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart commands
//! │   ├── quote.rs    ◄─── Order quotes
//! │   └── session.rs  ◄─── Session commands
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,teahouse=debug; override with RUST_LOG              │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • TEAHOUSE_* environment variables over defaults                    │
//! │                                                                         │
//! │  3. Open Token Store ─────────────────────────────────────────────────► │
//! │     • TEAHOUSE_TOKEN_PATH, or the platform app data directory           │
//! │                                                                         │
//! │  4. Restore Session ──────────────────────────────────────────────────► │
//! │     • Unknown → Authenticated | Anonymous (bad token purged)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{AuthState, CartState, FileTokenStore, PosConfig, TokenStore};

/// Everything the UI host manages for the lifetime of the app.
#[derive(Debug, Clone)]
pub struct PosApp {
    pub config: PosConfig,
    pub cart: CartState,
    pub auth: AuthState,
}

impl PosApp {
    /// Wires state together. The session starts `Unknown`; call
    /// [`PosApp::restore`] before routing.
    pub fn new(config: PosConfig, store: Arc<dyn TokenStore>) -> Self {
        PosApp {
            config,
            cart: CartState::new(),
            auth: AuthState::new(store),
        }
    }

    /// Loads configuration from the environment and opens the file token
    /// store.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = PosConfig::from_env().context("Failed to load configuration")?;
        let store = FileTokenStore::open(config.token_path.as_deref())
            .context("Failed to open token store")?;
        info!(path = ?store.path(), "Token store opened");

        Ok(PosApp::new(config, Arc::new(store)))
    }

    /// Restores the session from the persisted token.
    pub fn restore(&self) {
        let transition = self.auth.restore(Utc::now());
        info!(
            store = %self.config.store_name,
            authenticated = transition.state.is_authenticated(),
            "Teahouse POS ready"
        );
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=teahouse=trace` - Show trace for teahouse crates only
/// - Default: `info,teahouse=debug`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,teahouse=debug"));

    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::MemoryTokenStore;

    #[test]
    fn test_app_starts_anonymous_without_token() {
        let app = PosApp::new(PosConfig::default(), Arc::new(MemoryTokenStore::new()));
        assert!(app.auth.identity().is_none());

        app.restore();
        assert!(app.auth.with_session(|s| !s.is_authenticated()));
        assert!(commands::cart::get_cart(&app.cart).lines.is_empty());
    }
}
