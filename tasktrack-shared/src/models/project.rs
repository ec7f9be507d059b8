/// Project model and database operations
///
/// A project belongs to exactly one user (`created_by`) and is never removed
/// from the table. Deleting a project flips `is_deleted`, after which every
/// query in this module treats it as absent.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Website".to_string(),
///     description: "Relaunch".to_string(),
///     created_by: owner,
/// }).await?;
///
/// Project::soft_delete(&pool, project.id, owner).await?;
/// assert!(Project::find_active(&pool, project.id, owner).await?.is_none());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Short name (at most 100 characters)
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Owning user, fixed at creation
    pub created_by: Uuid,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last edited or deleted
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
///
/// `created_by` is always the authenticated caller, never client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
}

/// Editable project fields
///
/// Owner and id are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
    pub description: String,
}

impl Project {
    /// Creates a new, active project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, is_deleted, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Lists the owner's active projects in creation order
    pub async fn list_active_by_owner(
        pool: &PgPool,
        owner: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, created_by, is_deleted, created_at, updated_at
            FROM projects
            WHERE created_by = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Finds an active project owned by `owner`
    ///
    /// Missing, deleted and foreign projects all come back as `None`.
    pub async fn find_active(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, created_by, is_deleted, created_at, updated_at
            FROM projects
            WHERE id = $1 AND created_by = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Overwrites name and description of an active, owned project
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $3,
                description = $4,
                updated_at = NOW()
            WHERE id = $1 AND created_by = $2 AND is_deleted = FALSE
            RETURNING id, name, description, created_by, is_deleted, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Marks an active, owned project as deleted
    ///
    /// Returns `false` when nothing matched. Tasks are left untouched.
    pub async fn soft_delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET is_deleted = TRUE,
                updated_at = NOW()
            WHERE id = $1 AND created_by = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
