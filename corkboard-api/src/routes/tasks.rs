/// Task endpoints
///
/// Tasks are the ordered cards of a board. Listing goes through the
/// per-board read cache; every write to a board's task list invalidates
/// that board's cache entry before the response goes out.
///
/// Two bulk variants exist, deliberately asymmetric: the within-board
/// reorder silently skips tasks that are not on the board, while the
/// cross-board move validates every target board against the project
/// before touching anything.
///
/// # Endpoints
///
/// - `GET    /v1/projects/:project_id/boards/:board_id/tasks` - list (cached)
/// - `POST   /v1/projects/:project_id/boards/:board_id/tasks` - create task
/// - `PUT    /v1/projects/:project_id/boards/:board_id/tasks/positions` - bulk reorder
/// - `GET    /v1/projects/:project_id/boards/:board_id/tasks/:task_id` - read one task
/// - `PUT    /v1/projects/:project_id/boards/:board_id/tasks/:task_id` - update task
/// - `DELETE /v1/projects/:project_id/boards/:board_id/tasks/:task_id` - delete task
/// - `PUT    /v1/projects/:project_id/boards/tasks/:task_id` - cross-board move

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult, ValidationErrorDetail},
    routes::boards::{owned_board, owned_project, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use corkboard_shared::{
    auth::{middleware::AuthContext, ownership},
    cache::TaskListKey,
    models::{
        board::Board,
        project::Project,
        task::{present, CreateTask, Task, TaskMove, TaskPositionUpdate, UpdateTask},
    },
    ordering::PositionScheme,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Card title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Card category
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 255, message = "Type must be 1-255 characters"))]
    pub kind: String,

    /// Display color, hex string including the leading `#`
    #[validate(length(min = 1, max = 7, message = "Color must be at most 7 characters"))]
    pub color: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional image URL
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    /// Optional image id
    pub image_id: Option<i64>,

    /// Optional due date
    pub date: Option<NaiveDate>,
}

/// Partial task update request
///
/// Absent fields are unchanged; an explicit `null` clears a nullable field.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New category
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 255, message = "Type must be 1-255 characters"))]
    pub kind: Option<String>,

    /// New color
    #[validate(length(min = 1, max = 7, message = "Color must be at most 7 characters"))]
    pub color: Option<String>,

    /// New description
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    /// New image URL; checked in the handler since the derive cannot see
    /// through the double Option
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,

    /// New image id
    #[serde(default, deserialize_with = "present")]
    pub image_id: Option<Option<i64>>,

    /// New due date
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<NaiveDate>>,
}

/// Within-board bulk reorder request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskPositionsRequest {
    /// New positions; tasks not on the board are skipped
    #[validate(length(min = 1, message = "At least one task is required"))]
    pub tasks: Vec<TaskPositionUpdate>,
}

/// Cross-board move request
#[derive(Debug, Deserialize, Validate)]
pub struct MoveTasksRequest {
    /// Moves, applied all-or-nothing against the project's boards
    #[validate(length(min = 1, message = "At least one task is required"))]
    pub tasks: Vec<TaskMove>,
}

/// Fetches a task and verifies the full ownership chain
async fn owned_task(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
    board_id: Uuid,
    task_id: Uuid,
) -> ApiResult<(Project, Board, Task)> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ownership::authorize_task(auth.user_id, &project, &board, &task)?;

    Ok((project, board, task))
}

/// Lists a board's tasks ordered by position, served from the cache when fresh
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Task>>> {
    let (project, board) = owned_board(&state, &auth, project_id, board_id).await?;

    let key = TaskListKey {
        project_id: project.id,
        board_id: board.id,
    };

    if let Some(tasks) = state.task_cache.get(&key) {
        return Ok(Json(tasks));
    }

    let tasks = Task::list_by_board(&state.db, board.id).await?;
    state.task_cache.put(key, tasks.clone());

    Ok(Json(tasks))
}

/// Creates a task at the next allocated position
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let (project, board) = owned_board(&state, &auth, project_id, board_id).await?;

    req.validate()?;

    let max = Task::max_position(&state.db, board.id).await?;
    let position = PositionScheme::TASKS.next_position(max);

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id: board.id,
            title: req.title,
            kind: req.kind,
            color: req.color,
            description: req.description,
            image_url: req.image_url,
            image_id: req.image_id,
            date: req.date,
            position,
        },
    )
    .await?;

    state.task_cache.invalidate(&TaskListKey {
        project_id: project.id,
        board_id: board.id,
    });

    Ok((StatusCode::CREATED, Json(task)))
}

/// Reads one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Task>> {
    let (_, _, task) = owned_task(&state, &auth, project_id, board_id, task_id).await?;

    Ok(Json(task))
}

/// Applies a partial update to a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let (project, board, task) = owned_task(&state, &auth, project_id, board_id, task_id).await?;

    let mut violations = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_details(errors),
    };
    if let Some(Some(url)) = &req.image_url {
        if !url.validate_url() {
            violations.push(ValidationErrorDetail {
                field: "image_url".to_string(),
                message: "Image URL must be a valid URL".to_string(),
            });
        }
    }
    if !violations.is_empty() {
        return Err(ApiError::ValidationError(violations));
    }

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: req.title,
            kind: req.kind,
            color: req.color,
            description: req.description,
            image_url: req.image_url,
            image_id: req.image_id,
            date: req.date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    state.task_cache.invalidate(&TaskListKey {
        project_id: project.id,
        board_id: board.id,
    });

    Ok(Json(updated))
}

/// Deletes a task and reindexes the surviving siblings
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (project, board, task) = owned_task(&state, &auth, project_id, board_id, task_id).await?;

    Task::delete(&state.db, task.id).await?;
    Task::reindex_positions(&state.db, board.id).await?;

    state.task_cache.invalidate(&TaskListKey {
        project_id: project.id,
        board_id: board.id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Applies a within-board bulk reorder, skipping foreign tasks
///
/// Tasks not on the board are silently skipped; valid updates in the same
/// request persist.
pub async fn update_positions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTaskPositionsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (project, board) = owned_board(&state, &auth, project_id, board_id).await?;

    req.validate()?;

    let applied = Task::update_positions(&state.db, board.id, &req.tasks).await?;
    if applied < req.tasks.len() as u64 {
        tracing::debug!(
            board_id = %board.id,
            requested = req.tasks.len(),
            applied,
            "Skipped reorder entries for tasks not on the board"
        );
    }

    state.task_cache.invalidate(&TaskListKey {
        project_id: project.id,
        board_id: board.id,
    });

    Ok(Json(MessageResponse {
        message: "Task positions updated successfully.".to_string(),
    }))
}

/// Moves tasks across boards of the project, all-or-nothing
///
/// One target board outside the project fails the whole request with 403
/// and no task is touched. Source and target board caches are invalidated.
pub async fn move_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<MoveTasksRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let project = owned_project(&state, &auth, project_id).await?;

    // The path names one of the moved tasks; it must at least exist
    Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    req.validate()?;

    let task_ids: Vec<Uuid> = req.tasks.iter().map(|t| t.id).collect();
    let source_boards = Task::board_ids_of(&state.db, &task_ids).await?;

    Task::move_to_boards(&state.db, project.id, &req.tasks).await?;

    for board_id in source_boards
        .into_iter()
        .chain(req.tasks.iter().map(|t| t.board_id))
    {
        state.task_cache.invalidate(&TaskListKey {
            project_id: project.id,
            board_id,
        });
    }

    Ok(Json(MessageResponse {
        message: "Task boards updated successfully.".to_string(),
    }))
}
