/// Route handlers
///
/// - `health`: Health check endpoint
/// - `accounts`: Sign in, registration and sign out
/// - `projects`: Project list/detail/create/edit/delete
/// - `tasks`: Task create/edit/delete under a project

pub mod accounts;
pub mod health;
pub mod projects;
pub mod tasks;

use crate::error::WebError;
use uuid::Uuid;

/// Parses a path id; anything that is not a UUID is simply absent
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw).map_err(|_| WebError::NotFound)
}
