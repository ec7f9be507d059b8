/// Database models for TaskTrack
///
/// Each model carries its row type, the inputs used to create or change it,
/// and the PostgreSQL queries that back [`crate::store::PgStore`].
///
/// # Models
///
/// - `user`: Accounts that own projects
/// - `project`: Projects, owned by a user and soft-deletable
/// - `task`: Tasks, owned transitively through their project
///
/// Every read path filters `is_deleted = FALSE` and the owner, so callers
/// never see rows belonging to somebody else.

pub mod project;
pub mod task;
pub mod user;
