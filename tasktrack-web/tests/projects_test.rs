/// Project endpoint tests
///
/// Drive the real router against the in-memory store:
/// - listing is owner-scoped and skips deleted projects
/// - foreign, deleted and unknown ids all answer 404
/// - invalid forms re-render with 422 and write nothing
/// - the owner cannot be changed through the form

mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_text, TestContext};
use tasktrack_shared::store::Store;
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_list_is_owner_scoped() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/projects/new/", Some(&ctx.alice), "name=X&description=Y")
        .await;
    assert_redirect(&response, "/projects/");

    let projects = ctx.store.list_projects(ctx.alice.id()).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "X");
    assert_eq!(projects[0].description, "Y");
    assert_eq!(projects[0].created_by, ctx.alice.id());
    assert!(!projects[0].is_deleted);

    let alice_list = body_text(ctx.get("/projects/", Some(&ctx.alice)).await).await;
    assert!(alice_list.contains(&format!("/projects/{}/", projects[0].id)));

    let bob_response = ctx.get("/projects/", Some(&ctx.bob)).await;
    assert_eq!(bob_response.status(), StatusCode::OK);
    let bob_list = body_text(bob_response).await;
    assert!(!bob_list.contains(&projects[0].id.to_string()));
}

#[tokio::test]
async fn test_list_in_insertion_order() {
    let ctx = TestContext::new().await;
    let first = ctx.seed_project(&ctx.alice, "First").await;
    let second = ctx.seed_project(&ctx.alice, "Second").await;

    let html = body_text(ctx.get("/projects/", Some(&ctx.alice)).await).await;

    let first_at = html.find(&first.id.to_string()).unwrap();
    let second_at = html.find(&second.id.to_string()).unwrap();
    assert!(first_at < second_at);
}

#[tokio::test]
async fn test_create_stores_trimmed_values() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/projects/new/", Some(&ctx.alice), "name=++X++&description=%09Y%0A")
        .await;
    assert_redirect(&response, "/projects/");

    let projects = ctx.store.list_projects(ctx.alice.id()).await.unwrap();
    assert_eq!(projects[0].name, "X");
    assert_eq!(projects[0].description, "Y");
}

#[tokio::test]
async fn test_create_missing_fields_persists_nothing() {
    let ctx = TestContext::new().await;

    for body in ["description=Y", "name=X", "name=&description=", "name=+++&description=Y", ""] {
        let response = ctx.post_form("/projects/new/", Some(&ctx.alice), body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {:?}", body);

        let html = body_text(response).await;
        assert!(html.contains("This field is required."), "body {:?}", body);
    }

    assert_eq!(ctx.store.project_count().await, 0);
}

#[tokio::test]
async fn test_create_redisplays_input_on_error() {
    let ctx = TestContext::new().await;
    let long_name = "n".repeat(101);

    let response = ctx
        .post_form(
            "/projects/new/",
            Some(&ctx.alice),
            &format!("name={}&description=kept+text", long_name),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert!(html.contains("Ensure this value has at most 100 characters."));
    assert!(html.contains("kept text"));
    assert!(html.contains(&long_name));
    assert_eq!(ctx.store.project_count().await, 0);
}

#[tokio::test]
async fn test_create_ignores_submitted_owner() {
    let ctx = TestContext::new().await;

    let body = format!("name=X&description=Y&created_by={}", ctx.bob.id());
    let response = ctx.post_form("/projects/new/", Some(&ctx.alice), &body).await;
    assert_redirect(&response, "/projects/");

    assert_eq!(ctx.store.list_projects(ctx.alice.id()).await.unwrap().len(), 1);
    assert!(ctx.store.list_projects(ctx.bob.id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_detail_shows_project_and_active_tasks() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Website").await;
    let kept = ctx.seed_task(&project, "Keep me").await;
    let gone = ctx.seed_task(&project, "Remove me").await;
    ctx.store.delete_task(gone.id, ctx.alice.id()).await.unwrap();

    let response = ctx.get(&format!("/projects/{}/", project.id), Some(&ctx.alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Website"));
    assert!(html.contains(&kept.id.to_string()));
    assert!(!html.contains(&gone.id.to_string()));
}

#[tokio::test]
async fn test_foreign_project_is_not_found_everywhere() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Private").await;
    let bob = Some(&ctx.bob);

    let detail = format!("/projects/{}/", project.id);
    let edit = format!("/projects/{}/edit/", project.id);
    let delete = format!("/projects/{}/delete/", project.id);

    assert_eq!(ctx.get(&detail, bob).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get(&edit, bob).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get(&delete, bob).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        ctx.post_form(&edit, bob, "name=Hijacked&description=Z").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(ctx.post_form(&delete, bob, "").await.status(), StatusCode::NOT_FOUND);

    // Invalid input does not reveal the project either
    assert_eq!(ctx.post_form(&edit, bob, "").await.status(), StatusCode::NOT_FOUND);

    let row = ctx.store.project_row(project.id).await.unwrap();
    assert_eq!(row.name, "Private");
    assert!(!row.is_deleted);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let ctx = TestContext::new().await;
    let alice = Some(&ctx.alice);

    let missing = format!("/projects/{}/", Uuid::new_v4());
    assert_eq!(ctx.get(&missing, alice).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get("/projects/42/", alice).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get("/projects/42/edit/", alice).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        ctx.post_form("/projects/not-a-uuid/delete/", alice, "").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_edit_prefills_and_updates() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Old name").await;
    let edit = format!("/projects/{}/edit/", project.id);

    let html = body_text(ctx.get(&edit, Some(&ctx.alice)).await).await;
    assert!(html.contains("value=\"Old name\""));

    let response = ctx
        .post_form(&edit, Some(&ctx.alice), "name=New+name&description=New+description")
        .await;
    assert_redirect(&response, "/projects/");

    let row = ctx.store.project_row(project.id).await.unwrap();
    assert_eq!(row.name, "New name");
    assert_eq!(row.description, "New description");
    assert_eq!(row.created_by, ctx.alice.id());
}

#[tokio::test]
async fn test_edit_never_changes_owner() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Mine").await;

    let body = format!(
        "name=Still+mine&description=Y&created_by={}&is_deleted=true&id={}",
        ctx.bob.id(),
        Uuid::new_v4()
    );
    let response = ctx
        .post_form(&format!("/projects/{}/edit/", project.id), Some(&ctx.alice), &body)
        .await;
    assert_redirect(&response, "/projects/");

    let row = ctx.store.project_row(project.id).await.unwrap();
    assert_eq!(row.name, "Still mine");
    assert_eq!(row.created_by, ctx.alice.id());
    assert!(!row.is_deleted);
}

#[tokio::test]
async fn test_edit_invalid_keeps_row() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Intact").await;

    let response = ctx
        .post_form(
            &format!("/projects/{}/edit/", project.id),
            Some(&ctx.alice),
            "name=&description=changed",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let row = ctx.store.project_row(project.id).await.unwrap();
    assert_eq!(row.name, "Intact");
    assert_eq!(row.description, "Intact description");
}

#[tokio::test]
async fn test_delete_confirm_then_soft_delete() {
    let ctx = TestContext::new().await;
    let project = ctx.seed_project(&ctx.alice, "Doomed").await;
    let delete = format!("/projects/{}/delete/", project.id);

    let confirm = ctx.get(&delete, Some(&ctx.alice)).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_text(confirm).await.contains("Doomed"));
    assert!(!ctx.store.project_row(project.id).await.unwrap().is_deleted);

    let response = ctx.post_form(&delete, Some(&ctx.alice), "").await;
    assert_redirect(&response, "/projects/");

    // The row survives with the flag set
    let row = ctx.store.project_row(project.id).await.unwrap();
    assert!(row.is_deleted);

    let list = body_text(ctx.get("/projects/", Some(&ctx.alice)).await).await;
    assert!(!list.contains(&project.id.to_string()));

    let detail = format!("/projects/{}/", project.id);
    let edit = format!("/projects/{}/edit/", project.id);
    assert_eq!(ctx.get(&detail, Some(&ctx.alice)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get(&edit, Some(&ctx.alice)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.get(&delete, Some(&ctx.alice)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        ctx.post_form(&delete, Some(&ctx.alice), "").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_new_page_renders_empty_form() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/projects/new/", Some(&ctx.alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("name=\"name\""));
    assert!(html.contains("name=\"description\""));
    assert!(!html.contains("This field is required."));
}
