//! Common test utilities for integration tests
//!
//! - Router wired to a fresh in-memory store
//! - Two signed-in users (`alice`, `bob`) with session tokens
//! - Seeding helpers that write straight to the store
//! - Request and response helpers

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate};
use std::{collections::HashMap, sync::Arc};
use tasktrack_shared::{
    auth::{
        jwt::{create_token, Claims},
        password::hash_password,
    },
    models::{
        project::{CreateProject, Project},
        task::{CreateTask, Task},
        user::{CreateUser, User},
    },
    store::{MemoryStore, Store},
};
use tasktrack_web::{
    app::{build_router, AppState},
    config::Config,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const COOKIE: &str = "tasktrack_session";
pub const FORM: &str = "application/x-www-form-urlencoded";

/// A user with a ready-made session token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub config: Config,
    pub alice: TestUser,
    pub bob: TestUser,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [("STORAGE_BACKEND", "memory"), ("SESSION_SECRET", SECRET)]
        .into_iter()
        .collect();

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = test_config();

        let state = AppState::new(store.clone(), config.clone()).unwrap();
        let app = build_router(state);

        let alice = signed_in(&store, "alice").await;
        let bob = signed_in(&store, "bob").await;

        Self {
            store,
            app,
            config,
            alice,
            bob,
        }
    }

    /// Registers a user with a real password hash
    pub async fn add_user_with_password(&self, username: &str, password: &str) -> User {
        self.store
            .create_user(CreateUser {
                username: username.to_string(),
                password_hash: hash_password(password).unwrap(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_project(&self, owner: &TestUser, name: &str) -> Project {
        self.store
            .create_project(CreateProject {
                name: name.to_string(),
                description: format!("{} description", name),
                created_by: owner.id(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_task(&self, project: &Project, title: &str) -> Task {
        self.store
            .create_task(CreateTask {
                title: title.to_string(),
                description: format!("{} description", title),
                status: "open".to_string(),
                due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                project_id: project.id,
            })
            .await
            .unwrap()
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// GET with the user's session cookie, or anonymously
    pub async fn get(&self, uri: &str, user: Option<&TestUser>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, format!("{}={}", COOKIE, user.token));
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST an urlencoded form with the user's session cookie, or anonymously
    pub async fn post_form(
        &self,
        uri: &str,
        user: Option<&TestUser>,
        body: &str,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, format!("{}={}", COOKIE, user.token));
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

async fn signed_in(store: &MemoryStore, username: &str) -> TestUser {
    let user = store
        .create_user(CreateUser {
            username: username.to_string(),
            password_hash: "not-used-by-token-tests".to_string(),
        })
        .await
        .unwrap();

    let claims = Claims::new(user.id, user.username.clone(), Duration::hours(1));
    let token = create_token(&claims, SECRET).unwrap();

    TestUser { user, token }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
}

/// Asserts a 303 to the given path
pub fn assert_redirect(response: &Response<Body>, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}
