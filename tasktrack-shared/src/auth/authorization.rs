/// Authorization gate
///
/// Binds the caller to the resource before any read or write proceeds.
///
/// # Rules
///
/// - A project is accessible when it exists, is not deleted and was created
///   by the caller.
/// - A task is accessible when it exists, is not deleted, and its project is
///   accessible by the rule above.
///
/// Everything else is [`AccessError::NotFound`]. Missing, deleted and
/// foreign rows are deliberately indistinguishable, so the gate never
/// reveals that another user's data exists.
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::auth::authorization::{accessible_project, AccessError};
/// use tasktrack_shared::auth::middleware::AuthContext;
/// use tasktrack_shared::store::Store;
/// use uuid::Uuid;
///
/// async fn show(store: &dyn Store, auth: &AuthContext, id: Uuid) -> Result<String, AccessError> {
///     let project = accessible_project(store, auth, id).await?;
///     Ok(project.name)
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::{project::Project, task::Task};
use crate::store::{Store, StoreError};

/// Error type for the authorization gate
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Absent, soft-deleted or owned by someone else
    #[error("Not found")]
    NotFound,

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves a project the caller may read and change
pub async fn accessible_project(
    store: &dyn Store,
    auth: &AuthContext,
    id: Uuid,
) -> Result<Project, AccessError> {
    let project = store
        .find_project(id, auth.user_id)
        .await?
        .ok_or(AccessError::NotFound)?;

    require_ownership(auth, project.created_by)?;
    Ok(project)
}

/// Resolves a task the caller may read and change, with its parent project
///
/// `find_task` already filters on the task flag and the parent's owner and
/// flag. The parent is loaded again only because handlers render and
/// redirect with the project row.
pub async fn accessible_task(
    store: &dyn Store,
    auth: &AuthContext,
    id: Uuid,
) -> Result<(Task, Project), AccessError> {
    let task = store
        .find_task(id, auth.user_id)
        .await?
        .ok_or(AccessError::NotFound)?;

    let project = accessible_project(store, auth, task.project_id).await?;
    Ok((task, project))
}

/// Checks that the caller is the owner
///
/// Store queries already filter by owner; this is the in-process check on
/// the row that came back.
pub fn require_ownership(auth: &AuthContext, owner: Uuid) -> Result<(), AccessError> {
    if !auth.owns(owner) {
        return Err(AccessError::NotFound);
    }

    Ok(())
}
