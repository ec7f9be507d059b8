/// Task endpoints
///
/// A task is reachable only through an active project owned by the caller.
/// Create authorizes the parent project from the path; edit and delete
/// resolve the task and its parent together with [`accessible_task`].
/// Every success redirects to the parent project's detail page.
///
/// # Endpoints
///
/// - `GET|POST /projects/:id/tasks/new/` - Create under a project
/// - `GET|POST /tasks/:id/edit/` - Edit
/// - `GET|POST /tasks/:id/delete/` - Confirm / soft delete

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    routes::parse_id,
    views::{task_fields, ConfirmDeletePage, FormPage, Link},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tasktrack_shared::{
    auth::{
        authorization::{accessible_project, accessible_task},
        middleware::AuthContext,
    },
    forms::{FormErrors, TaskForm},
    models::project::Project,
};

fn project_path(project: &Project) -> String {
    format!("/projects/{}/", project.id)
}

fn render_form(
    state: &AppState,
    auth: &AuthContext,
    heading: String,
    action: String,
    project: &Project,
    form: &TaskForm,
    errors: &FormErrors,
) -> WebResult<String> {
    let page = FormPage::new(
        Some(&auth.username),
        heading,
        action,
        task_fields(form, errors),
        errors,
    )
    .cancel(Link::new(project_path(project), "Cancel"));

    Ok(state.views.render("form.html", &page)?)
}

/// Empty create form for a task under the project
pub async fn new_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
) -> WebResult<Html<String>> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&project_id)?).await?;

    let body = render_form(
        &state,
        &auth,
        format!("New task in {}", project.name),
        format!("/projects/{}/tasks/new/", project.id),
        &project,
        &TaskForm::default(),
        &FormErrors::new(),
    )?;

    Ok(Html(body))
}

/// Creates a task under the project named in the path
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
    Form(form): Form<TaskForm>,
) -> WebResult<Response> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&project_id)?).await?;

    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            let body = render_form(
                &state,
                &auth,
                format!("New task in {}", project.name),
                format!("/projects/{}/tasks/new/", project.id),
                &project,
                &form,
                &errors,
            )?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        }
    };

    let task = state.store.create_task(draft.under(project.id)).await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task created");

    Ok(Redirect::to(&project_path(&project)).into_response())
}

/// Edit form prefilled from the stored task
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let (task, project) = accessible_task(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let body = render_form(
        &state,
        &auth,
        "Edit task".to_string(),
        format!("/tasks/{}/edit/", task.id),
        &project,
        &TaskForm::from(&task),
        &FormErrors::new(),
    )?;

    Ok(Html(body))
}

/// Overwrites the task's fields; the parent project never changes
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> WebResult<Response> {
    let (task, project) = accessible_task(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            let body = render_form(
                &state,
                &auth,
                "Edit task".to_string(),
                format!("/tasks/{}/edit/", task.id),
                &project,
                &form,
                &errors,
            )?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        }
    };

    state
        .store
        .update_task(task.id, auth.user_id, draft.into())
        .await?
        .ok_or(WebError::NotFound)?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task updated");

    Ok(Redirect::to(&project_path(&project)).into_response())
}

/// Delete confirmation prompt
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let (task, project) = accessible_task(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let body = state.views.render(
        "confirm_delete.html",
        &ConfirmDeletePage {
            username: Some(&auth.username),
            kind: "task",
            object_name: &task.title,
            action: format!("/tasks/{}/delete/", task.id),
            cancel: Link::new(project_path(&project), "Cancel"),
        },
    )?;

    Ok(Html(body))
}

/// Soft-deletes the task
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let (task, project) = accessible_task(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    if !state.store.delete_task(task.id, auth.user_id).await? {
        return Err(WebError::NotFound);
    }

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task deleted");

    Ok(Redirect::to(&project_path(&project)))
}
