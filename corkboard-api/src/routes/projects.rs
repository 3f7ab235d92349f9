/// Project endpoints
///
/// Projects are the top of the ownership chain: every deeper read or
/// mutation first verifies that the caller owns the project.
///
/// # Endpoints
///
/// - `GET    /v1/projects` - list caller's projects with nested boards/tasks
/// - `POST   /v1/projects` - create project
/// - `GET    /v1/projects/:project_id` - read one project (nested)
/// - `PUT    /v1/projects/:project_id` - rename project
/// - `DELETE /v1/projects/:project_id` - delete project (cascades)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::boards::{nest_tasks, BoardWithTasks},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use corkboard_shared::{
    auth::{middleware::AuthContext, ownership},
    models::{
        board::Board,
        project::{CreateProject, Project},
        task::Task,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Update project request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Project with its ordered boards and their tasks
#[derive(Debug, Serialize)]
pub struct ProjectWithBoards {
    /// Project fields, flattened into the object
    #[serde(flatten)]
    pub project: Project,

    /// Boards ordered by position, each with its ordered tasks
    pub boards: Vec<BoardWithTasks>,
}

/// Groups boards (with their tasks) under their projects
///
/// Both inputs arrive ordered by position, so pushing preserves order.
fn nest_boards(projects: Vec<Project>, boards: Vec<Board>, tasks: Vec<Task>) -> Vec<ProjectWithBoards> {
    let mut by_project: HashMap<Uuid, Vec<BoardWithTasks>> = HashMap::new();
    for board in nest_tasks(boards, tasks) {
        by_project
            .entry(board.board.project_id)
            .or_default()
            .push(board);
    }

    projects
        .into_iter()
        .map(|project| ProjectWithBoards {
            boards: by_project.remove(&project.id).unwrap_or_default(),
            project,
        })
        .collect()
}

/// Lists the caller's projects with nested boards and tasks
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectWithBoards>>> {
    let projects = Project::list_by_owner(&state.db, auth.user_id).await?;

    let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
    let boards = Board::list_by_projects(&state.db, &project_ids).await?;

    let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
    let tasks = Task::list_by_boards(&state.db, &board_ids).await?;

    Ok(Json(nest_boards(projects, boards, tasks)))
}

/// Creates a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            owner_id: auth.user_id,
            name: req.name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Reads one project with nested boards and tasks
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectWithBoards>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ownership::authorize_project(auth.user_id, &project)?;

    let boards = Board::list_by_project(&state.db, project.id).await?;
    let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
    let tasks = Task::list_by_boards(&state.db, &board_ids).await?;

    let mut nested = nest_boards(vec![project], boards, tasks);
    // Exactly one project went in
    Ok(Json(nested.remove(0)))
}

/// Renames a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ownership::authorize_project(auth.user_id, &project)?;

    let updated = Project::update_name(&state.db, project.id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a project and everything under it
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ownership::authorize_project(auth.user_id, &project)?;

    Project::delete(&state.db, project.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
