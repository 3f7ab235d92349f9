/// Board endpoints
///
/// Boards are the ordered columns of a project. Creation allocates the next
/// position past the current maximum; deletion reindexes the survivors to a
/// dense sequence; the bulk reorder is all-or-nothing.
///
/// # Endpoints
///
/// - `GET    /v1/projects/:project_id/boards` - list boards with tasks
/// - `POST   /v1/projects/:project_id/boards` - create board
/// - `PUT    /v1/projects/:project_id/boards/positions` - bulk reorder
/// - `GET    /v1/projects/:project_id/boards/:board_id` - read one board
/// - `PUT    /v1/projects/:project_id/boards/:board_id` - rename board
/// - `DELETE /v1/projects/:project_id/boards/:board_id` - delete board

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use corkboard_shared::{
    auth::{middleware::AuthContext, ownership},
    cache::TaskListKey,
    models::{
        board::{Board, CreateBoard, PositionUpdate},
        project::Project,
        task::Task,
    },
    ordering::PositionScheme,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New board name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Bulk board reorder request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardPositionsRequest {
    /// New positions, applied all-or-nothing
    #[validate(length(min = 1, message = "At least one board is required"))]
    pub boards: Vec<PositionUpdate>,
}

/// Board with its ordered tasks
#[derive(Debug, Serialize)]
pub struct BoardWithTasks {
    /// Board fields, flattened into the object
    #[serde(flatten)]
    pub board: Board,

    /// Tasks ordered by position
    pub tasks: Vec<Task>,
}

/// Confirmation body for bulk operations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Groups tasks under their boards
///
/// Both inputs arrive ordered by position, so pushing preserves order.
pub fn nest_tasks(boards: Vec<Board>, tasks: Vec<Task>) -> Vec<BoardWithTasks> {
    let mut by_board: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_board.entry(task.board_id).or_default().push(task);
    }

    boards
        .into_iter()
        .map(|board| BoardWithTasks {
            tasks: by_board.remove(&board.id).unwrap_or_default(),
            board,
        })
        .collect()
}

/// Fetches a project and verifies the caller owns it
pub(crate) async fn owned_project(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
) -> ApiResult<Project> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ownership::authorize_project(auth.user_id, &project)?;

    Ok(project)
}

/// Fetches a board and verifies the full ownership chain
pub(crate) async fn owned_board(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
    board_id: Uuid,
) -> ApiResult<(Project, Board)> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    ownership::authorize_board(auth.user_id, &project, &board)?;

    Ok((project, board))
}

/// Lists a project's boards ordered by position, with their tasks
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<BoardWithTasks>>> {
    let project = owned_project(&state, &auth, project_id).await?;

    let boards = Board::list_by_project(&state.db, project.id).await?;
    let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
    let tasks = Task::list_by_boards(&state.db, &board_ids).await?;

    Ok(Json(nest_tasks(boards, tasks)))
}

/// Creates a board at the next allocated position
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let project = owned_project(&state, &auth, project_id).await?;

    req.validate()?;

    let max = Board::max_position(&state.db, project.id).await?;
    let position = PositionScheme::BOARDS.next_position(max);

    let board = Board::create(
        &state.db,
        CreateBoard {
            project_id: project.id,
            name: req.name,
            position,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

/// Reads one board with its ordered tasks
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<BoardWithTasks>> {
    let (_, board) = owned_board(&state, &auth, project_id, board_id).await?;

    let tasks = Task::list_by_board(&state.db, board.id).await?;

    Ok(Json(BoardWithTasks { board, tasks }))
}

/// Renames a board
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    let (_, board) = owned_board(&state, &auth, project_id, board_id).await?;

    req.validate()?;

    let updated = Board::update_name(&state.db, board.id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a board and reindexes the surviving siblings
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, board_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (project, board) = owned_board(&state, &auth, project_id, board_id).await?;

    Board::delete(&state.db, board.id).await?;
    Board::reindex_positions(&state.db, project.id).await?;

    // The board's tasks are gone with it; drop the cached list
    state.task_cache.invalidate(&TaskListKey {
        project_id: project.id,
        board_id: board.id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Applies a bulk board reorder, all-or-nothing
///
/// One board outside the project fails the whole request with 403 and no
/// position changes.
pub async fn update_positions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateBoardPositionsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let project = owned_project(&state, &auth, project_id).await?;

    req.validate()?;

    Board::update_positions(&state.db, project.id, &req.boards).await?;

    Ok(Json(MessageResponse {
        message: "Board positions updated successfully.".to_string(),
    }))
}
