/// In-memory store
///
/// Keeps users, projects and tasks in insertion-ordered vectors behind a
/// tokio `RwLock`. Visibility rules match [`super::PgStore`] exactly: rows
/// are never removed, deleted rows are filtered on every read, and a task is
/// only visible while its project is active and owned by the caller.
///
/// Data lives for the lifetime of the process. Selected with
/// `STORAGE_BACKEND=memory`; the web integration tests run against it.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
}

impl Tables {
    fn active_project(&self, id: Uuid, owner: Uuid) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id && p.created_by == owner && !p.is_deleted)
    }

    fn visible_task_index(&self, id: Uuid, owner: Uuid) -> Option<usize> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id && !t.is_deleted)?;
        let project_id = self.tasks[index].project_id;

        self.active_project(project_id, owner).map(|_| index)
    }
}

/// Process-local [`Store`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a task row regardless of deletion or ownership
    ///
    /// Inspection helper for tests; request handling goes through [`Store`].
    pub async fn task_row(&self, id: Uuid) -> Option<Task> {
        self.tables
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Returns a project row regardless of deletion or ownership
    pub async fn project_row(&self, id: Uuid) -> Option<Project> {
        self.tables
            .read()
            .await
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Total number of project rows, deleted ones included
    pub async fn project_count(&self) -> usize {
        self.tables.read().await.projects.len()
    }

    /// Total number of task rows, deleted ones included
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::UsernameTaken(data.username));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            password_hash: data.password_hash,
            created_at: Utc::now(),
            last_login_at: None,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn record_login(&self, user_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            created_by: data.created_by,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.created_by == owner && !p.is_deleted)
            .cloned()
            .collect())
    }

    async fn find_project(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.active_project(id, owner).cloned())
    }

    async fn update_project(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.created_by == owner && !p.is_deleted);

        Ok(project.map(|p| {
            p.name = data.name;
            p.description = data.description;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_project(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.created_by == owner && !p.is_deleted)
        {
            Some(project) => {
                project.is_deleted = true;
                project.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            status: data.status,
            due_date: data.due_date,
            project_id: data.project_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id && !t.is_deleted)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .visible_task_index(id, owner)
            .map(|index| tables.tasks[index].clone()))
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.visible_task_index(id, owner) else {
            return Ok(None);
        };

        let task = &mut tables.tasks[index];
        task.title = data.title;
        task.description = data.description;
        task.status = data.status;
        task.due_date = data.due_date;
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.visible_task_index(id, owner) else {
            return Ok(false);
        };

        let task = &mut tables.tasks[index];
        task.is_deleted = true;
        task.updated_at = Utc::now();

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_project(owner: Uuid, name: &str) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            description: "desc".to_string(),
            created_by: owner,
        }
    }

    fn new_task(project_id: Uuid, title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: "desc".to_string(),
            status: "open".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            project_id,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        let data = CreateUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        };

        store.create_user(data.clone()).await.unwrap();
        let err = store.create_user(data).await.unwrap_err();

        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_list_projects_filters_owner_and_deleted() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create_project(new_project(alice, "first")).await.unwrap();
        let second = store.create_project(new_project(alice, "second")).await.unwrap();
        store.create_project(new_project(bob, "other")).await.unwrap();

        assert!(store.delete_project(first.id, alice).await.unwrap());

        let listed = store.list_projects(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);

        // Row is kept
        assert!(store.project_row(first.id).await.unwrap().is_deleted);
        assert_eq!(store.project_count().await, 3);
    }

    #[tokio::test]
    async fn test_list_projects_keeps_insertion_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        for name in ["a", "b", "c"] {
            store.create_project(new_project(owner, name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list_projects(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_foreign_project_is_invisible() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let project = store.create_project(new_project(alice, "mine")).await.unwrap();

        assert!(store.find_project(project.id, bob).await.unwrap().is_none());
        assert!(!store.delete_project(project.id, bob).await.unwrap());

        let update = UpdateProject {
            name: "stolen".to_string(),
            description: "x".to_string(),
        };
        assert!(store.update_project(project.id, bob, update).await.unwrap().is_none());

        let row = store.project_row(project.id).await.unwrap();
        assert_eq!(row.name, "mine");
        assert!(!row.is_deleted);
    }

    #[tokio::test]
    async fn test_delete_project_twice() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let project = store.create_project(new_project(owner, "p")).await.unwrap();

        assert!(store.delete_project(project.id, owner).await.unwrap());
        assert!(!store.delete_project(project.id, owner).await.unwrap());
    }

    #[tokio::test]
    async fn test_task_hidden_when_project_deleted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let project = store.create_project(new_project(owner, "p")).await.unwrap();
        let task = store.create_task(new_task(project.id, "t")).await.unwrap();

        assert!(store.find_task(task.id, owner).await.unwrap().is_some());

        store.delete_project(project.id, owner).await.unwrap();

        assert!(store.find_task(task.id, owner).await.unwrap().is_none());
        assert!(!store.delete_task(task.id, owner).await.unwrap());

        // No cascade: the task row keeps its own flag
        let row = store.task_row(task.id).await.unwrap();
        assert!(!row.is_deleted);
    }

    #[tokio::test]
    async fn test_update_task_keeps_project() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let project = store.create_project(new_project(owner, "p")).await.unwrap();
        let task = store.create_task(new_task(project.id, "t")).await.unwrap();

        let updated = store
            .update_task(
                task.id,
                owner,
                UpdateTask {
                    title: "renamed".to_string(),
                    description: "d".to_string(),
                    status: "done".to_string(),
                    due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.status, "done");
        assert_eq!(updated.project_id, project.id);
    }

    #[tokio::test]
    async fn test_list_tasks_skips_deleted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let project = store.create_project(new_project(owner, "p")).await.unwrap();
        let kept = store.create_task(new_task(project.id, "kept")).await.unwrap();
        let gone = store.create_task(new_task(project.id, "gone")).await.unwrap();

        assert!(store.delete_task(gone.id, owner).await.unwrap());

        let tasks = store.list_tasks(project.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, kept.id);
        assert_eq!(store.task_count().await, 2);
    }
}
