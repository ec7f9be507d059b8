/// Caller identity for request handling
///
/// The web layer resolves the caller once per request and inserts an
/// [`AuthContext`] into the request extensions; handlers take it with
/// `Extension<AuthContext>` and pass it explicitly to every gate and store
/// call.
///
/// # Credential sources
///
/// Checked in order:
/// 1. `Authorization: Bearer <token>` header
/// 2. Session cookie (name configurable, `tasktrack_session` by default)
///
/// Both carry the same HS256 session token from [`super::jwt`].
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use tasktrack_shared::auth::middleware::session_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; tasktrack_session=abc"));
///
/// assert_eq!(session_token(&headers, "tasktrack_session").as_deref(), Some("abc"));
/// ```

use axum::http::{header, HeaderMap};
use cookie::{time, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};

/// Default session cookie name
pub const DEFAULT_SESSION_COOKIE: &str = "tasktrack_session";

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Caller's user ID
    pub user_id: Uuid,

    /// Caller's username
    pub username: String,
}

impl AuthContext {
    /// Builds the context from validated session claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }

    /// Whether the caller is the given owner
    pub fn owns(&self, owner: Uuid) -> bool {
        self.user_id == owner
    }
}

/// Error type for resolving the caller
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials on the request
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials present but not acceptable
    #[error("Invalid session: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Extracts the raw session token from the request headers
///
/// A bearer header wins over the cookie. Empty values count as absent.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// Resolves the caller from request headers
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] when neither header nor cookie is set
/// - [`AuthError::InvalidToken`] when the token fails validation
pub fn authenticate(
    headers: &HeaderMap,
    cookie_name: &str,
    secret: &str,
) -> Result<AuthContext, AuthError> {
    let token = session_token(headers, cookie_name).ok_or(AuthError::MissingCredentials)?;
    let claims = validate_token(&token, secret)?;

    Ok(AuthContext::from_claims(claims))
}

/// Builds the `Set-Cookie` value that stores a session token
pub fn session_cookie(name: &str, token: &str, ttl_hours: i64, secure: bool) -> String {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::hours(ttl_hours))
        .build()
        .to_string()
}

/// Builds the `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
        .to_string()
}
