/// Persistence boundary for the web layer
///
/// Handlers never talk to a database directly; they hold an
/// `Arc<dyn Store>` and call the operations below. Every project and task
/// method takes the caller's user ID and applies the ownership and
/// soft-delete filters itself, so a `None` / `false` result already means
/// "absent, deleted or not yours".
///
/// # Backends
///
/// - [`PgStore`]: PostgreSQL via sqlx, used in production
/// - [`MemoryStore`]: process-local tables, used for development and tests
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_shared::store::{MemoryStore, Store};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let projects = store.list_projects(Uuid::new_v4()).await?;
/// assert!(projects.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username is already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage operations used by request handlers
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Creates a user; fails with [`StoreError::UsernameTaken`] on duplicates
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by exact username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Records a successful sign-in
    async fn record_login(&self, user_id: Uuid) -> StoreResult<()>;

    /// Persists a new active project
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    /// Lists the owner's active projects in creation order
    async fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>>;

    /// Finds an active project owned by `owner`
    async fn find_project(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Project>>;

    /// Overwrites editable fields of an active, owned project
    async fn update_project(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>>;

    /// Soft-deletes an active, owned project
    async fn delete_project(&self, id: Uuid, owner: Uuid) -> StoreResult<bool>;

    /// Persists a new active task under an already-authorized project
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Lists the active tasks of a project in creation order
    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Finds an active task whose project is active and owned by `owner`
    async fn find_task(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Task>>;

    /// Overwrites editable fields of a visible task
    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>>;

    /// Soft-deletes a visible task
    async fn delete_task(&self, id: Uuid, owner: Uuid) -> StoreResult<bool>;
}
