/// PostgreSQL store backed by the model queries
///
/// Thin adapter from [`Store`] to the inherent methods on the models. The
/// only logic here is mapping the username unique violation to
/// [`StoreError::UsernameTaken`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

/// Unique constraint on `users.username`
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let username = data.username.clone();

        User::create(&self.pool, data).await.map_err(|err| match err {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(USERNAME_CONSTRAINT) =>
            {
                debug!(%username, "Username already registered");
                StoreError::UsernameTaken(username)
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn record_login(&self, user_id: Uuid) -> StoreResult<()> {
        Ok(User::update_last_login(&self.pool, user_id).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_active_by_owner(&self.pool, owner).await?)
    }

    async fn find_project(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_active(&self.pool, id, owner).await?)
    }

    async fn update_project(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, owner, data).await?)
    }

    async fn delete_project(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        Ok(Project::soft_delete(&self.pool, id, owner).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_active_by_project(&self.pool, project_id).await?)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_active(&self.pool, id, owner).await?)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, owner, data).await?)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        Ok(Task::soft_delete(&self.pool, id, owner).await?)
    }
}
