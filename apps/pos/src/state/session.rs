//! # Auth State
//!
//! Owns the [`SessionState`] and carries out the token effects its
//! transitions ask for.
//!
//! ```text
//!   event ──► SessionState::apply() ──► Transition { state, effect }
//!                                              │         │
//!                        replace held state ◄──┘         ▼
//!                                               Keep    → nothing
//!                                               Persist → store.save(token)
//!                                               Purge   → store.clear()
//! ```
//!
//! The session lock is held until the token effect finishes. A 401 racing a
//! login therefore always leaves storage empty once both are done.
//!
//! Storage failures never block a transition: the in-memory session is the
//! source of truth and a failed write is logged.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use teahouse_core::session::{SessionEvent, TokenEffect, Transition};
use teahouse_core::{SessionIdentity, SessionState};
use tracing::{debug, info, warn};

use super::token_store::TokenStore;

/// Shared session state plus its token store.
#[derive(Clone)]
pub struct AuthState {
    session: Arc<Mutex<SessionState>>,
    store: Arc<dyn TokenStore>,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The held token stays out of logs
        f.debug_struct("AuthState")
            .field("authenticated", &self.with_session(SessionState::is_authenticated))
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Creates the state in [`SessionState::Unknown`].
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        AuthState {
            session: Arc::new(Mutex::new(SessionState::Unknown)),
            store,
        }
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// The logged-in identity, if any.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.with_session(|s| s.identity().cloned())
    }

    /// The bearer token to attach to API requests, if any.
    pub fn token(&self) -> Option<String> {
        self.with_session(|s| s.token().map(str::to_string))
    }

    /// Reads the persisted token and materializes the session from it.
    ///
    /// An unreadable token file counts as a bad token: the session ends up
    /// anonymous and the file is purged.
    pub fn restore(&self, now: DateTime<Utc>) -> Transition {
        let stored = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read saved token");
                self.purge();
                None
            }
        };

        self.dispatch(SessionEvent::Restore(stored), now)
    }

    /// Applies an event and performs its token effect.
    pub fn dispatch(&self, event: SessionEvent, now: DateTime<Utc>) -> Transition {
        let event_name = event_name(&event);
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let transition = session.apply(event, now);
        *session = transition.state.clone();

        // The store write happens under the session lock so storage always
        // ends in the order the transitions were applied
        match &transition.effect {
            TokenEffect::Keep => {}
            TokenEffect::Persist(token) => {
                if let Err(e) = self.store.save(token) {
                    warn!(error = %e, "Could not persist token; session lasts until restart");
                }
            }
            TokenEffect::Purge => self.purge(),
        }
        drop(session);

        if let Some(reason) = &transition.rejected {
            warn!(event = event_name, reason = %reason, "Token rejected");
        }

        match transition.state.identity() {
            Some(identity) => info!(
                event = event_name,
                user_id = %identity.id,
                role = %identity.role,
                "Session authenticated"
            ),
            None => debug!(event = event_name, "Session anonymous"),
        }

        transition
    }

    fn purge(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not delete saved token");
        }
    }
}

fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::Restore(_) => "restore",
        SessionEvent::Login(_) => "login",
        SessionEvent::Logout => "logout",
        SessionEvent::Unauthorized => "unauthorized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MemoryTokenStore, StoreError};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn token(role: &str) -> String {
        encode(
            &Header::default(),
            &json!({ "sub": "9", "email": "an@teahouse.vn", "role": role }),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap()
    }

    #[test]
    fn test_restore_valid_token_keeps_storage() {
        let store = Arc::new(MemoryTokenStore::with_token(token("Staff")));
        let auth = AuthState::new(store.clone());

        let t = auth.restore(Utc::now());

        assert!(t.state.is_authenticated());
        assert_eq!(auth.identity().map(|i| i.role), Some("Staff".to_string()));
        assert_eq!(store.load().unwrap(), Some(token("Staff")));
    }

    #[test]
    fn test_restore_garbage_purges_storage() {
        let store = Arc::new(MemoryTokenStore::with_token("garbage-token"));
        let auth = AuthState::new(store.clone());

        let t = auth.restore(Utc::now());

        assert!(!t.state.is_authenticated());
        assert_eq!(auth.identity(), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_login_persists_and_logout_purges() {
        let store = Arc::new(MemoryTokenStore::new());
        let auth = AuthState::new(store.clone());
        auth.restore(Utc::now());

        auth.dispatch(SessionEvent::Login(token("Admin")), Utc::now());
        assert_eq!(store.load().unwrap(), Some(token("Admin")));
        assert_eq!(auth.token(), Some(token("Admin")));

        auth.dispatch(SessionEvent::Logout, Utc::now());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(auth.token(), None);
    }

    /// Blocks `save` until the test says go, then saves slowly.
    struct SlowStore {
        inner: MemoryTokenStore,
        entered: Barrier,
    }

    impl TokenStore for SlowStore {
        fn load(&self) -> Result<Option<String>, StoreError> {
            self.inner.load()
        }

        fn save(&self, token: &str) -> Result<(), StoreError> {
            self.entered.wait();
            thread::sleep(Duration::from_millis(100));
            self.inner.save(token)
        }

        fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear()
        }
    }

    #[test]
    fn test_unauthorized_during_login_save_leaves_storage_empty() {
        let store = Arc::new(SlowStore {
            inner: MemoryTokenStore::new(),
            entered: Barrier::new(2),
        });
        let auth = AuthState::new(store.clone());

        let login = {
            let auth = auth.clone();
            thread::spawn(move || auth.dispatch(SessionEvent::Login(token("Staff")), Utc::now()))
        };

        // Login is now inside save()
        store.entered.wait();
        auth.dispatch(SessionEvent::Unauthorized, Utc::now());
        login.join().unwrap();

        assert_eq!(auth.token(), None);
        assert_eq!(store.load().unwrap(), None);

        let restarted = AuthState::new(store.clone());
        assert!(!restarted.restore(Utc::now()).state.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = AuthState::new(Arc::new(MemoryTokenStore::new()));
        auth.dispatch(SessionEvent::Login(token("Staff")), Utc::now());

        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("authenticated: true"));
        assert!(!rendered.contains(&token("Staff")));
    }
}
