//! # Session Commands
//!
//! Login, logout, route guards and the 401 reaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Drives the Session                               │
//! │                                                                         │
//! │  App start ─────────► restore_session() ──► token file → identity      │
//! │  Login form ────────► login(token) ───────► persist token              │
//! │  Log out button ────► logout() ───────────► purge token                │
//! │  Any API response ──► handle_api_status() ─► 401 → logout + redirect   │
//! │  Route change ──────► require_role(role) ─► granted / login / forbidden│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use teahouse_core::session::{Access, SessionEvent};
use teahouse_core::SessionIdentity;
use tracing::{debug, info};

use crate::api::{authorization_header, ApiStatus};
use crate::error::ApiError;
use crate::state::{AuthState, PosConfig};

/// What the UI needs to render the header bar and guard routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub authenticated: bool,
    pub identity: Option<SessionIdentity>,
}

impl SessionView {
    fn of(auth: &AuthState) -> Self {
        let identity = auth.identity();
        SessionView {
            authenticated: identity.is_some(),
            identity,
        }
    }
}

/// The UI's next step after an API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiReaction {
    Continue { status: ApiStatus },
    RedirectToLogin { path: String },
}

/// Restores the session from the saved token at app start.
pub fn restore_session(auth: &AuthState) -> SessionView {
    debug!("restore_session command");
    auth.restore(Utc::now());
    SessionView::of(auth)
}

/// Current session, without touching storage.
pub fn get_session(auth: &AuthState) -> SessionView {
    SessionView::of(auth)
}

/// Starts a session from the token the login endpoint returned.
///
/// A token that does not decode leaves the app logged out and is reported
/// as `UNAUTHORIZED`.
pub fn login(auth: &AuthState, token: String) -> Result<SessionView, ApiError> {
    debug!("login command");

    let transition = auth.dispatch(SessionEvent::Login(token), Utc::now());
    if let Some(reason) = transition.rejected {
        return Err(reason.into());
    }

    Ok(SessionView::of(auth))
}

/// Ends the session and deletes the saved token.
pub fn logout(auth: &AuthState) -> SessionView {
    debug!("logout command");
    auth.dispatch(SessionEvent::Logout, Utc::now());
    SessionView::of(auth)
}

/// Reacts to the status of any backend response.
///
/// A 401 ends the session, purges the token and tells the UI to go to the
/// login page. Everything else passes through.
pub fn handle_api_status(auth: &AuthState, config: &PosConfig, status: u16) -> ApiReaction {
    match ApiStatus::classify(status) {
        ApiStatus::Unauthorized => {
            info!(status, "Backend rejected the session");
            auth.dispatch(SessionEvent::Unauthorized, Utc::now());
            ApiReaction::RedirectToLogin {
                path: config.login_path.clone(),
            }
        }
        other => ApiReaction::Continue { status: other },
    }
}

/// Route guard. Role matching is exact and case-sensitive.
pub fn require_role(auth: &AuthState, role: Option<&str>) -> Result<SessionIdentity, ApiError> {
    match auth.with_session(|s| s.check_access(role)) {
        Access::Granted => auth
            .identity()
            .ok_or_else(|| ApiError::unauthorized("Session ended")),
        Access::LoginRequired => Err(ApiError::unauthorized("Login required")),
        Access::Forbidden => Err(ApiError::forbidden(format!(
            "Role {} required",
            role.unwrap_or_default()
        ))),
    }
}

/// `Authorization` header value for the current session, if any.
pub fn auth_header(auth: &AuthState) -> Option<String> {
    auth.token().map(|t| authorization_header(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{MemoryTokenStore, TokenStore};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::sync::Arc;
    use teahouse_core::session::roles;

    fn token(role: &str) -> String {
        encode(
            &Header::default(),
            &json!({
                "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "u-1",
                "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress": "mai@teahouse.vn",
                "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name": "Mai",
                "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": role,
            }),
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    fn setup(stored: Option<String>) -> (AuthState, Arc<MemoryTokenStore>) {
        let store = Arc::new(match stored {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        (AuthState::new(store.clone()), store)
    }

    #[test]
    fn test_restore_without_token() {
        let (auth, _) = setup(None);
        let view = restore_session(&auth);

        assert!(!view.authenticated);
        assert_eq!(view.identity, None);
    }

    #[test]
    fn test_restore_with_token() {
        let (auth, _) = setup(Some(token("Staff")));
        let view = restore_session(&auth);

        assert!(view.authenticated);
        assert_eq!(view.identity.unwrap().name.as_deref(), Some("Mai"));
    }

    #[test]
    fn test_login_then_logout() {
        let (auth, store) = setup(None);
        restore_session(&auth);

        let view = login(&auth, token("Admin")).unwrap();
        assert!(view.authenticated);
        assert_eq!(auth_header(&auth), Some(format!("Bearer {}", token("Admin"))));

        let view = logout(&auth);
        assert!(!view.authenticated);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(auth_header(&auth), None);
    }

    #[test]
    fn test_login_with_garbage_fails() {
        let (auth, store) = setup(None);

        let err = login(&auth, "garbage-token".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(!get_session(&auth).authenticated);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_401_logs_out_and_redirects() {
        let (auth, store) = setup(Some(token("Staff")));
        restore_session(&auth);
        let config = PosConfig::default();

        let reaction = handle_api_status(&auth, &config, 401);

        assert_eq!(
            reaction,
            ApiReaction::RedirectToLogin {
                path: "/login".into()
            }
        );
        assert!(!get_session(&auth).authenticated);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_other_statuses_pass_through() {
        let (auth, _) = setup(Some(token("Staff")));
        restore_session(&auth);
        let config = PosConfig::default();

        for status in [200, 403, 404, 500] {
            assert!(matches!(
                handle_api_status(&auth, &config, status),
                ApiReaction::Continue { .. }
            ));
        }
        assert!(get_session(&auth).authenticated);
    }

    #[test]
    fn test_require_role() {
        let (auth, _) = setup(Some(token("Staff")));

        // Not restored yet
        assert_eq!(
            require_role(&auth, None).unwrap_err().code,
            ErrorCode::Unauthorized
        );

        restore_session(&auth);
        assert_eq!(require_role(&auth, Some(roles::STAFF)).unwrap().id, "u-1");
        assert_eq!(
            require_role(&auth, Some(roles::ADMIN)).unwrap_err().code,
            ErrorCode::Forbidden
        );
        assert_eq!(
            require_role(&auth, Some("STAFF")).unwrap_err().code,
            ErrorCode::Forbidden
        );
    }

    #[test]
    fn test_reaction_serialization() {
        let json = serde_json::to_value(ApiReaction::RedirectToLogin {
            path: "/login".into(),
        })
        .unwrap();
        assert_eq!(json, json!({ "action": "redirect_to_login", "path": "/login" }));
    }
}
