/// Error handling for the web server
///
/// Handlers return `WebResult<T>`. Every failure that is not a form
/// validation problem ends up here and is mapped to a response:
///
/// | Variant | Response |
/// |---|---|
/// | `Unauthenticated` | 303 to `/accounts/login/?next=<path>` |
/// | `NotFound` | 404 page |
/// | `Store`, `Template`, `Internal` | 500 page, details only in the log |
///
/// Validation failures are not errors at this level: the handler re-renders
/// the form itself with status 422.
///
/// # Example
///
/// ```no_run
/// use tasktrack_web::error::{WebError, WebResult};
/// use axum::response::Html;
///
/// async fn handler(found: bool) -> WebResult<Html<&'static str>> {
///     if !found {
///         return Err(WebError::NotFound);
///     }
///     Ok(Html("<p>ok</p>"))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tasktrack_shared::{
    auth::{authorization::AccessError, jwt::JwtError, password::PasswordError},
    store::StoreError,
};

/// Path of the sign-in page
pub const LOGIN_PATH: &str = "/accounts/login/";

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Unified web error type
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No signed-in caller; `next` is the path to return to
    #[error("Authentication required for {next}")]
    Unauthenticated { next: String },

    /// Absent, soft-deleted or owned by someone else
    #[error("Not found")]
    NotFound,

    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Template rendering failure
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Any other server fault
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Builds the sign-in URL that returns to `next` afterwards
pub fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{}?{}", LOGIN_PATH, query),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>Not Found</title></head>\
<body><h1>Not Found</h1><p>The requested resource was not found on this server.</p></body></html>\n";

const SERVER_ERROR_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>Server Error</title></head>\
<body><h1>Server Error (500)</h1></body></html>\n";

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Unauthenticated { next } => Redirect::to(&login_url(&next)).into_response(),
            WebError::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
            other => {
                // Log server faults but don't expose details to clients
                tracing::error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

impl From<AccessError> for WebError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => WebError::NotFound,
            AccessError::Store(err) => WebError::Store(err),
        }
    }
}

impl From<PasswordError> for WebError {
    fn from(err: PasswordError) -> Self {
        WebError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for WebError {
    fn from(err: JwtError) -> Self {
        WebError::Internal(format!("Session token failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/projects/"), "/accounts/login/?next=%2Fprojects%2F");
        assert_eq!(
            login_url("/projects/?a=1&b=2"),
            "/accounts/login/?next=%2Fprojects%2F%3Fa%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_unauthenticated_redirects() {
        let response = WebError::Unauthenticated {
            next: "/projects/".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login/?next=%2Fprojects%2F"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(WebError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            WebError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebError::from(AccessError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_display() {
        let err = WebError::Unauthenticated {
            next: "/tasks/1/edit/".to_string(),
        };
        assert_eq!(err.to_string(), "Authentication required for /tasks/1/edit/");
        assert_eq!(WebError::NotFound.to_string(), "Not found");
    }
}
