/// Database layer for TaskTrack
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: Embedded schema migrations
///
/// Models and their queries live in [`crate::models`].

pub mod migrations;
pub mod pool;
