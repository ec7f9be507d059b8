/// Account endpoints
///
/// Sign in, registration and sign out for the browser session. A successful
/// sign in issues a session token and stores it in an HttpOnly cookie.
///
/// # Endpoints
///
/// - `GET|POST /accounts/login/` - Sign in, honoring a local `next` path
/// - `GET|POST /accounts/register/` - Create an account and sign in
/// - `POST /accounts/logout/` - Drop the session cookie
/// - `GET /` - Redirect to the project list

use crate::{
    app::AppState,
    error::{WebResult, LOGIN_PATH},
    views::{login_fields, register_fields, FormPage, Link},
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Duration;
use serde::Deserialize;
use tasktrack_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::{clear_session_cookie, session_cookie},
        password::{hash_password, verify_password},
    },
    forms::{FormErrors, LoginForm, RegisterForm},
    models::user::{CreateUser, User},
    store::StoreError,
};

/// Where a signed-in user lands by default
pub const HOME_PATH: &str = "/projects/";

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Query string of the sign-in page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Returns `next` when it is a path on this site, otherwise the home page
///
/// Rejects absolute and scheme-relative URLs so the sign-in page cannot be
/// used as an open redirect. Only visible ASCII is accepted: browsers drop
/// tabs and newlines from a `Location` (`/\t/host` becomes `//host`), and the
/// value must also be a valid header.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && path.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            path
        }
        _ => HOME_PATH,
    }
}

fn render_login(state: &AppState, form: &LoginForm, errors: &FormErrors) -> WebResult<String> {
    let page = FormPage::new(None, "Log in", LOGIN_PATH, login_fields(form, errors), errors)
        .submit("Log in")
        .next(form.next.clone().filter(|next| !next.is_empty()))
        .cancel(Link::new("/accounts/register/", "Create an account"));

    Ok(state.views.render("form.html", &page)?)
}

fn render_register(
    state: &AppState,
    form: &RegisterForm,
    errors: &FormErrors,
) -> WebResult<String> {
    let page = FormPage::new(
        None,
        "Create an account",
        "/accounts/register/",
        register_fields(form, errors),
        errors,
    )
    .submit("Register")
    .cancel(Link::new(LOGIN_PATH, "Log in instead"));

    Ok(state.views.render("form.html", &page)?)
}

/// Issues a session token for the user and redirects with the cookie set
fn start_session(state: &AppState, user: &User, target: &str) -> WebResult<Response> {
    let ttl_hours = state.config.session.ttl_hours;
    let claims = Claims::new(user.id, user.username.clone(), Duration::hours(ttl_hours));
    let token = create_token(&claims, state.session_secret())?;

    let cookie = session_cookie(state.cookie_name(), &token, ttl_hours, state.secure_cookies());

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

/// Root path
pub async fn index() -> Redirect {
    Redirect::to(HOME_PATH)
}

/// Sign-in form
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> WebResult<Html<String>> {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };

    Ok(Html(render_login(&state, &form, &FormErrors::new())?))
}

/// Verifies credentials and starts a session
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    if let Err(errors) = form.clean() {
        let body = render_login(&state, &form, &errors)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
    }

    let user = state.store.find_user_by_username(form.username.trim()).await?;

    let verified = match &user {
        Some(user) => verify_password(&form.password, &user.password_hash)?,
        None => false,
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::info!(username = %form.username.trim(), "Failed sign in");
            let mut errors = FormErrors::new();
            errors.add_non_field(INVALID_LOGIN);
            let body = render_login(&state, &form, &errors)?;
            return Ok((StatusCode::UNAUTHORIZED, Html(body)).into_response());
        }
    };

    state.store.record_login(user.id).await?;

    tracing::info!(user_id = %user.id, "User signed in");

    start_session(&state, &user, safe_next(form.next.as_deref()))
}

/// Registration form
pub async fn register_page(State(state): State<AppState>) -> WebResult<Html<String>> {
    Ok(Html(render_register(&state, &RegisterForm::default(), &FormErrors::new())?))
}

/// Creates an account and signs it in
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> WebResult<Response> {
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            let body = render_register(&state, &form, &errors)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        }
    };

    let password_hash = hash_password(&draft.password)?;

    let user = match state
        .store
        .create_user(CreateUser {
            username: draft.username,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::UsernameTaken(_)) => {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            let body = render_register(&state, &form, &errors)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id = %user.id, "User registered");

    start_session(&state, &user, HOME_PATH)
}

/// Clears the session cookie
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(state.cookie_name(), state.secure_cookies());

    ([(header::SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH)).into_response()
}
