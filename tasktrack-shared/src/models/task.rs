/// Task model and database operations
///
/// Tasks have no owner column of their own. Ownership is resolved through the
/// parent project, so every lookup joins `projects` and requires the project
/// to be active and owned by the caller as well as the task to be active.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL,
///     status VARCHAR(20) NOT NULL,
///     due_date DATE NOT NULL,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use tasktrack_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Write copy".to_string(),
///     description: "Landing page".to_string(),
///     status: "open".to_string(),
///     due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     project_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task inside a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title (at most 100 characters)
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Free-text status, e.g. "open" (at most 20 characters)
    pub status: String,

    /// Calendar due date
    pub due_date: NaiveDate,

    /// Parent project, fixed at creation
    pub project_id: Uuid,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last edited or deleted
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// `project_id` comes from the already-authorized parent project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: NaiveDate,
    pub project_id: Uuid,
}

/// Editable task fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: NaiveDate,
}

impl Task {
    /// Creates a new, active task
    ///
    /// The caller is responsible for having checked the parent project.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, due_date, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, due_date, project_id,
                      is_deleted, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.project_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID without any visibility filter
    ///
    /// Returns soft-deleted rows too. Request handling goes through
    /// [`Task::find_active`] instead.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, due_date, project_id,
                   is_deleted, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the active tasks of a project in creation order
    pub async fn list_active_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, due_date, project_id,
                   is_deleted, created_at, updated_at
            FROM tasks
            WHERE project_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds an active task whose project is active and owned by `owner`
    pub async fn find_active(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.due_date, t.project_id,
                   t.is_deleted, t.created_at, t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1
              AND t.is_deleted = FALSE
              AND p.created_by = $2
              AND p.is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Overwrites the editable fields of a visible task
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks t
            SET title = $3,
                description = $4,
                status = $5,
                due_date = $6,
                updated_at = NOW()
            FROM projects p
            WHERE t.id = $1
              AND p.id = t.project_id
              AND t.is_deleted = FALSE
              AND p.created_by = $2
              AND p.is_deleted = FALSE
            RETURNING t.id, t.title, t.description, t.status, t.due_date, t.project_id,
                      t.is_deleted, t.created_at, t.updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Marks a visible task as deleted
    pub async fn soft_delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks t
            SET is_deleted = TRUE,
                updated_at = NOW()
            FROM projects p
            WHERE t.id = $1
              AND p.id = t.project_id
              AND t.is_deleted = FALSE
              AND p.created_by = $2
              AND p.is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
