/// Ownership guard for the project → board → task hierarchy
///
/// Every read or mutation that crosses a tenancy boundary runs through
/// [`authorize`] first. The guard is a pure predicate over entities the
/// caller has already fetched: the caller must own the project, a given
/// board must belong to that project, and a given task must belong to that
/// board.
///
/// All links are checked before the verdict is produced, and the error is
/// the same whichever link failed, so a rejected response reveals nothing
/// about which part of the chain was wrong. A reference that does not
/// resolve at all is the caller's concern (404) and happens before this
/// guard runs.
///
/// # Example
///
/// ```
/// use corkboard_shared::auth::ownership::authorize;
/// # use corkboard_shared::models::project::Project;
/// # use chrono::Utc;
/// # use uuid::Uuid;
///
/// # let owner_id = Uuid::new_v4();
/// # let project = Project {
/// #     id: Uuid::new_v4(),
/// #     owner_id,
/// #     name: "Roadmap".to_string(),
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// assert!(authorize(owner_id, &project, None, None).is_ok());
/// assert!(authorize(Uuid::new_v4(), &project, None, None).is_err());
/// ```

use crate::models::{board::Board, project::Project, task::Task};
use uuid::Uuid;

/// The ownership chain did not check out
///
/// Deliberately carries no detail about which link failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not authorized to access this resource")]
pub struct OwnershipError;

/// Verifies the caller's ownership chain down to the deepest given entity
///
/// - `project.owner_id` must equal `user_id`
/// - `board.project_id` must equal `project.id` when a board is given
/// - `task.board_id` must equal `board.id` when a task is given (a task
///   without its board never authorizes)
pub fn authorize(
    user_id: Uuid,
    project: &Project,
    board: Option<&Board>,
    task: Option<&Task>,
) -> Result<(), OwnershipError> {
    let owner_ok = project.owner_id == user_id;
    let board_ok = board.map_or(true, |b| b.project_id == project.id);
    let task_ok = match (board, task) {
        (Some(b), Some(t)) => t.board_id == b.id,
        (None, Some(_)) => false,
        _ => true,
    };

    // Non-short-circuiting: every link is evaluated before the verdict
    if owner_ok & board_ok & task_ok {
        Ok(())
    } else {
        Err(OwnershipError)
    }
}

/// Verifies project ownership only
pub fn authorize_project(user_id: Uuid, project: &Project) -> Result<(), OwnershipError> {
    authorize(user_id, project, None, None)
}

/// Verifies ownership down to a board
pub fn authorize_board(
    user_id: Uuid,
    project: &Project,
    board: &Board,
) -> Result<(), OwnershipError> {
    authorize(user_id, project, Some(board), None)
}

/// Verifies ownership down to a task
pub fn authorize_task(
    user_id: Uuid,
    project: &Project,
    board: &Board,
    task: &Task,
) -> Result<(), OwnershipError> {
    authorize(user_id, project, Some(board), Some(task))
}
