//! # TaskTrack Shared Library
//!
//! Domain types, persistence and access control used by the TaskTrack web
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Users, projects and tasks, with their PostgreSQL queries
//! - `store`: The `Store` trait and its PostgreSQL / in-memory backends
//! - `db`: Connection pooling and migrations
//! - `auth`: Password hashing, session tokens and the authorization gate
//! - `forms`: Typed form input and field-level validation

pub mod auth;
pub mod db;
pub mod forms;
pub mod models;
pub mod store;

/// Current version of the TaskTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
