/// Project endpoints
///
/// Every handler runs behind the session layer and receives the caller as
/// `Extension<AuthContext>`. Object-scoped handlers go through
/// [`accessible_project`] first, so missing, deleted and foreign projects
/// all answer 404.
///
/// # Endpoints
///
/// - `GET /projects/` - Active projects of the caller
/// - `GET /projects/:id/` - Project with its active tasks
/// - `GET|POST /projects/new/` - Create
/// - `GET|POST /projects/:id/edit/` - Edit
/// - `GET|POST /projects/:id/delete/` - Confirm / soft delete

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    routes::parse_id,
    views::{project_fields, ConfirmDeletePage, FormPage, Link, ProjectDetailPage, ProjectListPage},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tasktrack_shared::{
    auth::{authorization::accessible_project, middleware::AuthContext},
    forms::{FormErrors, ProjectForm},
};

const LIST_PATH: &str = "/projects/";

fn detail_path(id: impl std::fmt::Display) -> String {
    format!("/projects/{}/", id)
}

fn render_form(
    state: &AppState,
    auth: &AuthContext,
    heading: &str,
    action: String,
    form: &ProjectForm,
    errors: &FormErrors,
) -> WebResult<String> {
    let page = FormPage::new(
        Some(&auth.username),
        heading,
        action,
        project_fields(form, errors),
        errors,
    )
    .cancel(Link::new(LIST_PATH, "Cancel"));

    Ok(state.views.render("form.html", &page)?)
}

fn invalid(body: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
}

/// Lists the caller's active projects in creation order
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> WebResult<Html<String>> {
    let projects = state.store.list_projects(auth.user_id).await?;

    let body = state.views.render(
        "project_list.html",
        &ProjectListPage {
            username: Some(&auth.username),
            projects: &projects,
        },
    )?;

    Ok(Html(body))
}

/// Shows an active, owned project and its active tasks
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&id)?).await?;
    let tasks = state.store.list_tasks(project.id).await?;

    let body = state.views.render(
        "project_detail.html",
        &ProjectDetailPage {
            username: Some(&auth.username),
            project: &project,
            tasks: &tasks,
        },
    )?;

    Ok(Html(body))
}

/// Empty create form
pub async fn new_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> WebResult<Html<String>> {
    let body = render_form(
        &state,
        &auth,
        "New project",
        "/projects/new/".to_string(),
        &ProjectForm::default(),
        &FormErrors::new(),
    )?;

    Ok(Html(body))
}

/// Creates a project owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<ProjectForm>,
) -> WebResult<Response> {
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            let body = render_form(
                &state,
                &auth,
                "New project",
                "/projects/new/".to_string(),
                &form,
                &errors,
            )?;
            return Ok(invalid(body));
        }
    };

    let project = state.store.create_project(draft.owned_by(auth.user_id)).await?;

    tracing::info!(project_id = %project.id, user_id = %auth.user_id, "Project created");

    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Edit form prefilled from the stored project
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let body = render_form(
        &state,
        &auth,
        "Edit project",
        format!("/projects/{}/edit/", project.id),
        &ProjectForm::from(&project),
        &FormErrors::new(),
    )?;

    Ok(Html(body))
}

/// Overwrites name and description; the owner never changes
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Form(form): Form<ProjectForm>,
) -> WebResult<Response> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            let action = format!("/projects/{}/edit/", project.id);
            let body = render_form(&state, &auth, "Edit project", action, &form, &errors)?;
            return Ok(invalid(body));
        }
    };

    state
        .store
        .update_project(project.id, auth.user_id, draft.into())
        .await?
        .ok_or(WebError::NotFound)?;

    tracing::info!(project_id = %project.id, user_id = %auth.user_id, "Project updated");

    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Delete confirmation prompt
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    let body = state.views.render(
        "confirm_delete.html",
        &ConfirmDeletePage {
            username: Some(&auth.username),
            kind: "project",
            object_name: &project.name,
            action: format!("/projects/{}/delete/", project.id),
            cancel: Link::new(detail_path(project.id), "Cancel"),
        },
    )?;

    Ok(Html(body))
}

/// Soft-deletes the project; its tasks are left as they are
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let project = accessible_project(state.store.as_ref(), &auth, parse_id(&id)?).await?;

    if !state.store.delete_project(project.id, auth.user_id).await? {
        return Err(WebError::NotFound);
    }

    tracing::info!(project_id = %project.id, user_id = %auth.user_id, "Project deleted");

    Ok(Redirect::to(LIST_PATH))
}
