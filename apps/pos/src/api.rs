//! # REST API Helpers
//!
//! The shell never sends requests itself; the UI's data layer does. These
//! helpers keep the request header and the status reaction in one place.
//!
//! ```text
//! request  ──► Authorization: Bearer <token>
//!
//! response ──► ApiStatus::classify(status)
//!               ├── 2xx       → Success
//!               ├── 401       → Unauthorized ──► logout + redirect to login
//!               ├── 403       → Forbidden
//!               ├── other 4xx → ClientError
//!               ├── 5xx       → ServerError
//!               └── anything else → Unexpected
//! ```

use serde::Serialize;

const BEARER_PREFIX: &str = "Bearer ";

/// Builds the `Authorization` header value for a token.
pub fn authorization_header(token: &str) -> String {
    format!("{}{}", BEARER_PREFIX, token)
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token is `None`.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let prefix = header.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = header[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

/// Joins the configured base URL with an endpoint path.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// How the shell reacts to an HTTP status from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    Success,
    /// The backend refused the token: the session must end.
    Unauthorized,
    Forbidden,
    ClientError,
    ServerError,
    /// 1xx/3xx: the data layer follows redirects, so these are unexpected.
    Unexpected,
}

impl ApiStatus {
    pub fn classify(status: u16) -> Self {
        match status {
            200..=299 => ApiStatus::Success,
            401 => ApiStatus::Unauthorized,
            403 => ApiStatus::Forbidden,
            400..=499 => ApiStatus::ClientError,
            500..=599 => ApiStatus::ServerError,
            _ => ApiStatus::Unexpected,
        }
    }
}
