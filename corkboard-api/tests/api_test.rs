/// Integration tests for the Corkboard API
///
/// These tests drive the full router end-to-end against a real database:
/// - Authentication and ownership rejection
/// - Position allocation on create and reindexing after delete
/// - Both bulk reorder variants (all-or-nothing vs. skip)
/// - Cross-board moves and their project-membership check
/// - Task-list cache invalidation on writes
/// - Validation failure shapes
///
/// A running PostgreSQL instance is required; tests skip themselves when
/// `DATABASE_URL` is not set.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::{json, Value};

/// Creates a project via the API and returns its id
async fn create_project(ctx: &TestContext, name: &str) -> String {
    let (status, body) = ctx
        .request("POST", "/v1/projects", Some(json!({ "name": name })))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create project: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Creates a board via the API and returns (id, position)
async fn create_board(ctx: &TestContext, project_id: &str, name: &str) -> (String, i64) {
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{project_id}/boards"),
            Some(json!({ "name": name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create board: {body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["position"].as_i64().unwrap(),
    )
}

/// Creates a task via the API and returns (id, position)
async fn create_task(
    ctx: &TestContext,
    project_id: &str,
    board_id: &str,
    title: &str,
) -> (String, i64) {
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks"),
            Some(json!({ "title": title, "type": "feature", "color": "#38B2AC" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create task: {body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["position"].as_i64().unwrap(),
    )
}

/// Lists a board's tasks via the API
async fn list_tasks(ctx: &TestContext, project_id: &str, board_id: &str) -> Vec<Value> {
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "list tasks: {body}");
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_register_login_and_authenticated_listing() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let email = format!("register-{}@example.com", uuid::Uuid::new_v4());
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            Some(json!({ "email": email, "password": "SecureP@ss123", "name": "Reg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "register: {body}");
    assert!(body["access_token"].is_string());

    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/login",
            Some(json!({ "email": email, "password": "SecureP@ss123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "login: {body}");
    let token = body["access_token"].as_str().unwrap().to_string();

    // The fresh account owns no projects yet
    let (status, body) = ctx.request_as(&token, "GET", "/v1/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Wrong password is rejected
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/login",
            Some(json!({ "email": email, "password": "WrongP@ss123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (status, _) = ctx.request_as("", "GET", "/v1/projects", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_project_crud_and_ownership() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "Roadmap").await;

    // Another user cannot see, rename, or delete it
    let stranger = TestContext::create_user(&ctx.db).await;
    let stranger_token = TestContext::token_for(&stranger);

    let uri = format!("/v1/projects/{project_id}");
    let (status, _) = ctx.request_as(&stranger_token, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request_as(&stranger_token, "PUT", &uri, Some(json!({ "name": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.request_as(&stranger_token, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner can do all three
    let (status, body) = ctx
        .request("PUT", &uri, Some(json!({ "name": "Renamed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    let (status, _) = ctx.request("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.request("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    corkboard_shared::models::user::User::delete(&ctx.db, stranger.id)
        .await
        .unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_board_positions_allocate_then_reindex_after_delete() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;

    // Allocator: first board lands at 10, second at 20
    let (board_a, pos_a) = create_board(&ctx, &project_id, "A").await;
    let (board_b, pos_b) = create_board(&ctx, &project_id, "B").await;
    assert_eq!(pos_a, 10);
    assert_eq!(pos_b, 20);

    // Deleting A reindexes the survivor to rank 1
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/projects/{project_id}/boards/{board_a}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx
        .request("GET", &format!("/v1/projects/{project_id}/boards"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let boards = body.as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["id"], Value::String(board_b));
    assert_eq!(boards[0]["position"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_positions_allocate_then_reindex_after_delete() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_id, _) = create_board(&ctx, &project_id, "Backlog").await;

    // Allocator: 1, 2, 3
    let (task_a, pos_a) = create_task(&ctx, &project_id, &board_id, "a").await;
    let (task_b, pos_b) = create_task(&ctx, &project_id, &board_id, "b").await;
    let (task_c, pos_c) = create_task(&ctx, &project_id, &board_id, "c").await;
    assert_eq!((pos_a, pos_b, pos_c), (1, 2, 3));

    // Deleting the middle task reindexes survivors to 10, 20 in the same
    // relative order
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks/{task_b}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let tasks = list_tasks(&ctx, &project_id, &board_id).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], Value::String(task_a));
    assert_eq!(tasks[0]["position"], 10);
    assert_eq!(tasks[1]["id"], Value::String(task_c));
    assert_eq!(tasks[1]["position"], 20);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_board_bulk_reorder_is_all_or_nothing() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_one = create_project(&ctx, "One").await;
    let project_two = create_project(&ctx, "Two").await;
    let (board_a, _) = create_board(&ctx, &project_one, "A").await;
    let (board_b, _) = create_board(&ctx, &project_one, "B").await;
    let (foreign_board, _) = create_board(&ctx, &project_two, "Foreign").await;

    // One foreign board poisons the whole request
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/projects/{project_one}/boards/positions"),
            Some(json!({ "boards": [
                { "id": board_a, "position": 2 },
                { "id": foreign_board, "position": 1 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No position changed, including the valid entry's
    let (_, body) = ctx
        .request("GET", &format!("/v1/projects/{project_one}/boards"), None)
        .await;
    let boards = body.as_array().unwrap();
    assert_eq!(boards[0]["id"], Value::String(board_a.clone()));
    assert_eq!(boards[0]["position"], 10);
    assert_eq!(boards[1]["position"], 20);

    // An all-valid request applies
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/projects/{project_one}/boards/positions"),
            Some(json!({ "boards": [
                { "id": board_a, "position": 2 },
                { "id": board_b, "position": 1 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = ctx
        .request("GET", &format!("/v1/projects/{project_one}/boards"), None)
        .await;
    let boards = body.as_array().unwrap();
    assert_eq!(boards[0]["id"], Value::String(board_b));
    assert_eq!(boards[1]["id"], Value::String(board_a));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_bulk_reorder_skips_foreign_tasks() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_x, _) = create_board(&ctx, &project_id, "X").await;
    let (board_y, _) = create_board(&ctx, &project_id, "Y").await;
    let (task_one, _) = create_task(&ctx, &project_id, &board_x, "one").await;
    let (task_two, _) = create_task(&ctx, &project_id, &board_x, "two").await;
    let (foreign_task, _) = create_task(&ctx, &project_id, &board_y, "foreign").await;

    // The foreign task is skipped; the valid entries still apply
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/projects/{project_id}/boards/{board_x}/tasks/positions"),
            Some(json!({ "tasks": [
                { "id": task_one, "position": 40 },
                { "id": foreign_task, "position": 50 },
                { "id": task_two, "position": 30 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let tasks = list_tasks(&ctx, &project_id, &board_x).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], Value::String(task_two));
    assert_eq!(tasks[0]["position"], 30);
    assert_eq!(tasks[1]["id"], Value::String(task_one));
    assert_eq!(tasks[1]["position"], 40);

    // The foreign task kept its board and position
    let tasks = list_tasks(&ctx, &project_id, &board_y).await;
    assert_eq!(tasks[0]["id"], Value::String(foreign_task));
    assert_eq!(tasks[0]["position"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_move_tasks_across_boards() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_x, _) = create_board(&ctx, &project_id, "X").await;
    let (board_y, _) = create_board(&ctx, &project_id, "Y").await;
    let (task_id, _) = create_task(&ctx, &project_id, &board_x, "movable").await;

    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/projects/{project_id}/boards/tasks/{task_id}"),
            Some(json!({ "tasks": [
                { "id": task_id, "boardId": board_y, "position": 5 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(list_tasks(&ctx, &project_id, &board_x).await.is_empty());
    let tasks = list_tasks(&ctx, &project_id, &board_y).await;
    assert_eq!(tasks[0]["id"], Value::String(task_id));
    assert_eq!(tasks[0]["position"], 5);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_move_tasks_to_other_project_is_forbidden() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_p = create_project(&ctx, "P").await;
    let project_q = create_project(&ctx, "Q").await;
    let (board_x, _) = create_board(&ctx, &project_p, "X").await;
    let (board_z, _) = create_board(&ctx, &project_q, "Z").await;
    let (task_id, _) = create_task(&ctx, &project_p, &board_x, "stays").await;

    // The target board belongs to another project: whole request fails
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/v1/projects/{project_p}/boards/tasks/{task_id}"),
            Some(json!({ "tasks": [
                { "id": task_id, "boardId": board_z, "position": 1 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The task never left its board
    let tasks = list_tasks(&ctx, &project_p, &board_x).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], Value::String(task_id));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_ownership_chain_rejects_mismatched_parents() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    // Two projects of the same user: a board read through the wrong
    // project path must be rejected even though the user owns both
    let project_p = create_project(&ctx, "P").await;
    let project_q = create_project(&ctx, "Q").await;
    let (board_in_q, _) = create_board(&ctx, &project_q, "B").await;

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/projects/{project_p}/boards/{board_in_q}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_list_cache_never_serves_pre_write_state() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_id, _) = create_board(&ctx, &project_id, "B").await;
    create_task(&ctx, &project_id, &board_id, "first").await;

    // Prime the cache
    assert_eq!(list_tasks(&ctx, &project_id, &board_id).await.len(), 1);

    // A write within the TTL window must be visible immediately
    let (second_id, _) = create_task(&ctx, &project_id, &board_id, "second").await;
    let tasks = list_tasks(&ctx, &project_id, &board_id).await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1]["id"], Value::String(second_id.clone()));

    // Same for deletes
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks/{second_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(list_tasks(&ctx, &project_id, &board_id).await.len(), 1);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_partial_update_and_null_clearing() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_id, _) = create_board(&ctx, &project_id, "B").await;

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks"),
            Some(json!({
                "title": "Card",
                "type": "feature",
                "color": "#FF0000",
                "description": "keep me around"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = body["id"].as_str().unwrap().to_string();
    let uri = format!("/v1/projects/{project_id}/boards/{board_id}/tasks/{task_id}");

    // Absent fields stay unchanged
    let (status, body) = ctx
        .request("PUT", &uri, Some(json!({ "title": "Renamed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["description"], "keep me around");
    assert_eq!(body["type"], "feature");

    // An explicit null clears the nullable field
    let (status, body) = ctx
        .request("PUT", &uri, Some(json!({ "description": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["description"], Value::Null);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_task_validation_reports_all_violations() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "P").await;
    let (board_id, _) = create_board(&ctx, &project_id, "B").await;

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/projects/{project_id}/boards/{board_id}/tasks"),
            Some(json!({
                "title": "x".repeat(300),
                "type": "feature",
                "color": "#AABBCCDD",
                "image_url": "not a url"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(body["error"], "validation_error");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"color"));
    assert!(fields.contains(&"image_url"));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_nested_listing_orders_by_position() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let project_id = create_project(&ctx, "Nested").await;
    let (board_a, _) = create_board(&ctx, &project_id, "A").await;
    let (board_b, _) = create_board(&ctx, &project_id, "B").await;
    create_task(&ctx, &project_id, &board_a, "a1").await;
    create_task(&ctx, &project_id, &board_b, "b1").await;
    create_task(&ctx, &project_id, &board_b, "b2").await;

    let (status, body) = ctx
        .request("GET", &format!("/v1/projects/{project_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let boards = body["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0]["id"], Value::String(board_a));
    assert_eq!(boards[0]["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(boards[1]["id"], Value::String(board_b));
    assert_eq!(boards[1]["tasks"].as_array().unwrap().len(), 2);

    ctx.cleanup().await;
}
