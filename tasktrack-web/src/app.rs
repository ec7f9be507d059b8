/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_shared::store::MemoryStore;
/// use tasktrack_web::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config, error::WebError, middleware::security::SecurityHeadersLayer, views::Views,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tasktrack_shared::{auth::middleware::authenticate, store::Store};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Compiled templates
    pub views: Arc<Views>,
}

impl AppState {
    /// Creates new application state, compiling the templates
    pub fn new(store: Arc<dyn Store>, config: Config) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
        })
    }

    /// Secret for signing session tokens
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }

    /// Whether cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /                                   -> redirect to /projects/
/// /health                             health check (public)
/// /accounts/login/        GET|POST    sign in (public)
/// /accounts/register/     GET|POST    create account (public)
/// /accounts/logout/       POST        sign out
/// /projects/              GET         list            (session required)
/// /projects/new/          GET|POST    create
/// /projects/:id/          GET         detail
/// /projects/:id/edit/     GET|POST    edit
/// /projects/:id/delete/   GET|POST    confirm / soft delete
/// /projects/:id/tasks/new/ GET|POST   task create
/// /tasks/:id/edit/        GET|POST    task edit
/// /tasks/:id/delete/      GET|POST    task confirm / soft delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. Session authentication (project and task routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::accounts::index))
        .route("/health", get(routes::health::health_check))
        .route(
            "/accounts/login/",
            get(routes::accounts::login_page).post(routes::accounts::login),
        )
        .route(
            "/accounts/register/",
            get(routes::accounts::register_page).post(routes::accounts::register),
        )
        .route("/accounts/logout/", post(routes::accounts::logout));

    let protected_routes = Router::new()
        .route("/projects/", get(routes::projects::list))
        .route(
            "/projects/new/",
            get(routes::projects::new_page).post(routes::projects::create),
        )
        .route("/projects/:id/", get(routes::projects::detail))
        .route(
            "/projects/:id/edit/",
            get(routes::projects::edit_page).post(routes::projects::update),
        )
        .route(
            "/projects/:id/delete/",
            get(routes::projects::confirm_delete).post(routes::projects::delete),
        )
        .route(
            "/projects/:id/tasks/new/",
            get(routes::tasks::new_page).post(routes::tasks::create),
        )
        .route(
            "/tasks/:id/edit/",
            get(routes::tasks::edit_page).post(routes::tasks::update),
        )
        .route(
            "/tasks/:id/delete/",
            get(routes::tasks::confirm_delete).post(routes::tasks::delete),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Resolves the caller from the bearer header or session cookie and injects
/// an `AuthContext` into request extensions. Anyone else is sent to the
/// sign-in page with the current path as `next`.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let auth = authenticate(req.headers(), state.cookie_name(), state.session_secret()).map_err(
        |err| {
            tracing::debug!(error = %err, path = %req.uri().path(), "Unauthenticated request");
            WebError::Unauthenticated {
                next: req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| req.uri().path().to_string()),
            }
        },
    )?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
