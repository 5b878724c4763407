//! # Session Materializer
//!
//! Turns the bearer token the SPA holds into a typed identity, and models
//! the session lifecycle as an explicit state machine.
//!
//! ## No Partial Sessions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    materialize_session(token, now)                      │
//! │                                                                         │
//! │  None / ""  ─────────────────────────────► Anonymous (keep storage)    │
//! │                                                                         │
//! │  "eyJ..."  ──► decode claims ──┬─ ok ────► Authenticated(identity)     │
//! │                                │                                        │
//! │                                └─ err ───► Anonymous + PURGE token     │
//! │                                   (malformed, claim missing, expired)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Signatures are NOT verified here. The backend verifies the token on
//! every request; a forged token only changes what the UI shows until the
//! first 401 drives the session back to anonymous.
//!
//! ## State Machine
//! ```text
//!                 Restore(valid)
//!   ┌─────────┐ ─────────────────► ┌───────────────┐
//!   │ Unknown │                    │ Authenticated │ ◄──┐
//!   └─────────┘ ──┐                └───────────────┘    │ Login(valid)
//!                 │ Restore(none/bad)   │ Logout        │
//!                 ▼                     │ Unauthorized  │
//!            ┌───────────┐ ◄────────────┘               │
//!            │ Anonymous │ ─────────────────────────────┘
//!            └───────────┘
//! ```
//! No terminal state: login/logout cycles repeat for the app's lifetime.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::error::SessionError;

// =============================================================================
// Claim Mapping
// =============================================================================

/// Identity fields read from the claims payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimField {
    Id,
    Email,
    Name,
    Role,
}

impl ClaimField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClaimField::Id => "id",
            ClaimField::Email => "email",
            ClaimField::Name => "name",
            ClaimField::Role => "role",
        }
    }
}

/// Claim keys per field, in lookup order. The first key present wins.
///
/// The backend issues ASP.NET-style claim URIs; the short registered names
/// are accepted as fallbacks.
pub const CLAIM_KEYS: &[(ClaimField, &[&str])] = &[
    (
        ClaimField::Id,
        &[
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
            "sub",
            "id",
        ],
    ),
    (
        ClaimField::Email,
        &[
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
            "email",
        ],
    ),
    (
        ClaimField::Name,
        &[
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
            "name",
            "unique_name",
        ],
    ),
    (
        ClaimField::Role,
        &[
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
            "role",
        ],
    ),
];

/// Role strings the backend assigns.
pub mod roles {
    /// Back-office access: products, vouchers, accounts, cash flow.
    pub const ADMIN: &str = "Admin";
    /// Counter access: ordering and checkout.
    pub const STAFF: &str = "Staff";
}

// =============================================================================
// Session Identity
// =============================================================================

/// Who is logged in, as read from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionIdentity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl SessionIdentity {
    /// Exact, case-sensitive role check. Roles have no hierarchy:
    /// `"Admin"` does not satisfy `"Staff"`.
    pub fn has_role(&self, required: &str) -> bool {
        self.role == required
    }

    /// Name for the header bar, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Decodes a token into an identity.
///
/// `now` is only compared against the optional `exp` claim.
///
/// ## Errors
/// - [`SessionError::Malformed`] if the token is not a decodable JWT
/// - [`SessionError::MissingClaim`] if `id`, `email` or `role` is absent
/// - [`SessionError::Expired`] if `exp` is at or before `now`
pub fn decode_identity(token: &str, now: DateTime<Utc>) -> Result<SessionIdentity, SessionError> {
    let claims = decode_claims(token)?;

    if let Some(exp) = claims.get("exp").and_then(numeric_claim) {
        if exp <= now.timestamp() {
            return Err(SessionError::Expired { expired_at: exp });
        }
    }

    Ok(SessionIdentity {
        id: required_claim(&claims, ClaimField::Id)?,
        email: required_claim(&claims, ClaimField::Email)?,
        name: lookup_claim(&claims, ClaimField::Name),
        role: required_claim(&claims, ClaimField::Role)?,
    })
}

/// Reads the payload segment without checking the signature.
fn decode_claims(token: &str) -> Result<Map<String, Value>, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Map<String, Value>>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| SessionError::Malformed(e.to_string()))
}

fn lookup_claim(claims: &Map<String, Value>, field: ClaimField) -> Option<String> {
    let keys = CLAIM_KEYS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or_default();

    keys.iter()
        .filter_map(|key| claims.get(*key))
        .find_map(string_claim)
}

fn required_claim(claims: &Map<String, Value>, field: ClaimField) -> Result<String, SessionError> {
    lookup_claim(claims, field).ok_or(SessionError::MissingClaim {
        field: field.as_str(),
    })
}

fn string_claim(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn numeric_claim(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Materialization
// =============================================================================

/// Result of materializing a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The token decoded into a complete identity.
    Authenticated(SessionIdentity),

    /// No session. `rejected` holds the decode failure when a token was
    /// present; in that case the stored token must be purged.
    Anonymous { rejected: Option<SessionError> },
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionOutcome::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            SessionOutcome::Authenticated(identity) => Some(identity),
            SessionOutcome::Anonymous { .. } => None,
        }
    }

    /// Whether the caller must delete its persisted copy of the token.
    pub fn purge_token(&self) -> bool {
        matches!(self, SessionOutcome::Anonymous { rejected: Some(_) })
    }
}

/// Materializes a session from an optional token.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use teahouse_core::session::materialize_session;
///
/// let none = materialize_session(None, Utc::now());
/// assert!(!none.is_authenticated());
/// assert!(!none.purge_token());
///
/// let garbage = materialize_session(Some("garbage-token"), Utc::now());
/// assert!(!garbage.is_authenticated());
/// assert!(garbage.purge_token());
/// ```
pub fn materialize_session(token: Option<&str>, now: DateTime<Utc>) -> SessionOutcome {
    let token = match token.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return SessionOutcome::Anonymous { rejected: None },
    };

    match decode_identity(token, now) {
        Ok(identity) => SessionOutcome::Authenticated(identity),
        Err(e) => SessionOutcome::Anonymous { rejected: Some(e) },
    }
}

// =============================================================================
// Session State Machine
// =============================================================================

/// The single source of truth for who is using the app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// App just started, storage not read yet.
    #[default]
    Unknown,
    /// A valid token is held.
    Authenticated {
        identity: SessionIdentity,
        token: String,
    },
    /// Nobody is logged in.
    Anonymous,
}

/// Inputs that move the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// App start: the token read from storage, if any.
    Restore(Option<String>),
    /// Login form returned a token.
    Login(String),
    /// User pressed "log out".
    Logout,
    /// Any API call answered 401.
    Unauthorized,
}

/// What to do with the persisted token after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEffect {
    /// Storage is already correct.
    Keep,
    /// Write this token to storage.
    Persist(String),
    /// Delete the token from storage.
    Purge,
}

/// Outcome of a transition: the next state and the storage effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: TokenEffect,
    /// Why a presented token was refused, for logging and the login form.
    pub rejected: Option<SessionError>,
}

/// Result of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Access {
    Granted,
    /// Logged in, but with a different role.
    Forbidden,
    /// Not logged in: redirect to the login path.
    LoginRequired,
}

impl SessionState {
    /// Applies an event. Pure: the caller performs [`TokenEffect`].
    pub fn apply(&self, event: SessionEvent, now: DateTime<Utc>) -> Transition {
        match event {
            SessionEvent::Restore(stored) => {
                match materialize_session(stored.as_deref(), now) {
                    SessionOutcome::Authenticated(identity) => Transition {
                        state: SessionState::Authenticated {
                            identity,
                            token: stored.map(|t| t.trim().to_string()).unwrap_or_default(),
                        },
                        effect: TokenEffect::Keep,
                        rejected: None,
                    },
                    SessionOutcome::Anonymous { rejected } => Transition {
                        state: SessionState::Anonymous,
                        effect: if rejected.is_some() {
                            TokenEffect::Purge
                        } else {
                            TokenEffect::Keep
                        },
                        rejected,
                    },
                }
            }
            SessionEvent::Login(token) => match materialize_session(Some(&token), now) {
                SessionOutcome::Authenticated(identity) => {
                    let token = token.trim().to_string();
                    Transition {
                        state: SessionState::Authenticated {
                            identity,
                            token: token.clone(),
                        },
                        effect: TokenEffect::Persist(token),
                        rejected: None,
                    }
                }
                SessionOutcome::Anonymous { rejected } => Transition {
                    state: SessionState::Anonymous,
                    effect: TokenEffect::Purge,
                    rejected,
                },
            },
            SessionEvent::Logout | SessionEvent::Unauthorized => Transition {
                state: SessionState::Anonymous,
                effect: TokenEffect::Purge,
                rejected: None,
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            SessionState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// The bearer token to attach to API requests.
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Route guard: `None` means any logged-in user.
    pub fn check_access(&self, required_role: Option<&str>) -> Access {
        match (self.identity(), required_role) {
            (None, _) => Access::LoginRequired,
            (Some(_), None) => Access::Granted,
            (Some(identity), Some(role)) if identity.has_role(role) => Access::Granted,
            (Some(_), Some(_)) => Access::Forbidden,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
