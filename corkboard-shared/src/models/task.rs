/// Task model and database operations
///
/// Tasks are the ordered cards of a board. A task belongs to exactly one
/// board at a time; `board_id` changes only through the cross-board move,
/// and only to a board of the same project (enforced at the project level
/// by the caller's ownership check plus the membership validation here).
///
/// Positions are allocated with a gap of 1 on creation and rewritten to
/// `10, 20, 30, …` after every delete (see [`crate::ordering`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     kind VARCHAR(255) NOT NULL,
///     color VARCHAR(7) NOT NULL DEFAULT '#38B2AC',
///     description TEXT,
///     image_url VARCHAR(512),
///     image_id BIGINT,
///     date DATE,
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::ordering::PositionScheme;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning board; changes only through the cross-board move
    pub board_id: Uuid,

    /// Card title
    pub title: String,

    /// Card category (serialized as `type`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Display color, hex string including the leading `#`
    pub color: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional attached image URL
    pub image_url: Option<String>,

    /// Optional attached image id in the image store
    pub image_id: Option<i64>,

    /// Optional due date
    pub date: Option<NaiveDate>,

    /// Ordering key among sibling tasks; lower sorts first
    pub position: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning board
    pub board_id: Uuid,

    /// Card title
    pub title: String,

    /// Card category
    pub kind: String,

    /// Display color
    pub color: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional image URL
    pub image_url: Option<String>,

    /// Optional image id
    pub image_id: Option<i64>,

    /// Optional due date
    pub date: Option<NaiveDate>,

    /// Position from the allocator (see [`PositionScheme::TASKS`])
    pub position: i32,
}

/// Input for a partial task update
///
/// Outer `None` = leave the column unchanged. For nullable columns the
/// inner `None` writes NULL, so an explicit JSON `null` clears the field
/// while an absent field keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New category
    pub kind: Option<String>,

    /// New color
    pub color: Option<String>,

    /// New description (Some(None) clears)
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    /// New image URL (Some(None) clears)
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,

    /// New image id (Some(None) clears)
    #[serde(default, deserialize_with = "present")]
    pub image_id: Option<Option<i64>>,

    /// New due date (Some(None) clears)
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<NaiveDate>>,
}

/// Wraps any present value (including null) in the outer Some, so absent
/// fields stay distinguishable from explicit nulls
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// One entry of a within-board bulk reorder request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskPositionUpdate {
    /// Task to move
    pub id: Uuid,

    /// New ordering key
    pub position: i32,
}

/// One entry of a cross-board move request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskMove {
    /// Task to move
    pub id: Uuid,

    /// Target board; must belong to the authorized project
    #[serde(rename = "boardId")]
    pub board_id: Uuid,

    /// New ordering key on the target board
    pub position: i32,
}

/// Error type for the cross-board move
#[derive(Debug, thiserror::Error)]
pub enum TaskMoveError {
    /// A target board is not part of the authorized project
    #[error("Board {0} does not belong to the project")]
    ForeignBoard(Uuid),

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const TASK_COLUMNS: &str = "id, board_id, title, kind, color, description, image_url, \
                            image_id, date, position, created_at, updated_at";

impl Task {
    /// Creates a new task at the given position
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (board_id, title, kind, color, description, image_url, image_id, date, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, board_id, title, kind, color, description, image_url,
                      image_id, date, position, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.kind)
        .bind(data.color)
        .bind(data.description)
        .bind(data.image_url)
        .bind(data.image_id)
        .bind(data.date)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a board's tasks ordered by position (ties resolve by id)
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE board_id = $1 ORDER BY position, id"
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks of several boards in one query, ordered by position
    ///
    /// Used to assemble nested board listings without a query per board.
    pub async fn list_by_boards(
        pool: &PgPool,
        board_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE board_id = ANY($1) ORDER BY position, id"
        ))
        .bind(board_ids)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Distinct boards the given tasks currently sit on
    ///
    /// The move handler uses this to invalidate source-board caches.
    pub async fn board_ids_of(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let board_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT DISTINCT board_id FROM tasks WHERE id = ANY($1)")
                .bind(task_ids)
                .fetch_all(pool)
                .await?;

        Ok(board_ids)
    }

    /// Largest position among a board's tasks, None when the board has none
    ///
    /// Input to the position allocator on creation.
    pub async fn max_position(pool: &PgPool, board_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(position) FROM tasks WHERE board_id = $1")
                .bind(board_id)
                .fetch_one(pool)
                .await?;

        Ok(max)
    }

    /// Applies a partial update
    ///
    /// Only the fields present in `data` are written; the UPDATE statement
    /// is built dynamically so untouched columns keep their values.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.kind.is_some() {
            bind_count += 1;
            query.push_str(&format!(", kind = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image_url = ${}", bind_count));
        }
        if data.image_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image_id = ${}", bind_count));
        }
        if data.date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(kind) = data.kind {
            q = q.bind(kind);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(image_url) = data.image_url {
            q = q.bind(image_url);
        }
        if let Some(image_id) = data.image_id {
            q = q.bind(image_id);
        }
        if let Some(date) = data.date {
            q = q.bind(date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Callers must reindex the surviving siblings afterwards.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrites every surviving task's position to the dense `10, 20, 30, …` sequence
    ///
    /// Runs after a delete. The relative order of survivors (by pre-delete
    /// `(position, id)`) is preserved; their absolute positions are not.
    pub async fn reindex_positions(pool: &PgPool, board_id: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM tasks WHERE board_id = $1 ORDER BY position, id")
                .bind(board_id)
                .fetch_all(&mut *tx)
                .await?;

        let count = ids.len();
        for (id, position) in ids.into_iter().zip(PositionScheme::TASKS.reindex(count)) {
            sqlx::query("UPDATE tasks SET position = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Applies a within-board bulk reorder, skipping foreign tasks
    ///
    /// Each update is applied independently; an update whose task is not on
    /// the board matches zero rows and is silently skipped while the rest
    /// persist. This is deliberately weaker than the board variant's
    /// all-or-nothing check.
    ///
    /// Returns the number of tasks actually moved.
    pub async fn update_positions(
        pool: &PgPool,
        board_id: Uuid,
        updates: &[TaskPositionUpdate],
    ) -> Result<u64, sqlx::Error> {
        let mut applied = 0;

        for update in updates {
            let result = sqlx::query(
                "UPDATE tasks SET position = $2, updated_at = NOW() WHERE id = $1 AND board_id = $3",
            )
            .bind(update.id)
            .bind(update.position)
            .bind(board_id)
            .execute(pool)
            .await?;

            applied += result.rows_affected();
        }

        Ok(applied)
    }

    /// Moves tasks across boards of one project, all-or-nothing
    ///
    /// Every target board is checked against the authorized project before
    /// any write; one foreign target fails the whole request and no task is
    /// touched. Valid moves update `board_id` and `position` unconditionally
    /// in a single transaction.
    pub async fn move_to_boards(
        pool: &PgPool,
        project_id: Uuid,
        moves: &[TaskMove],
    ) -> Result<(), TaskMoveError> {
        let mut tx = pool.begin().await?;

        let members: HashSet<Uuid> =
            sqlx::query_scalar("SELECT id FROM boards WHERE project_id = $1")
                .bind(project_id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        for task_move in moves {
            if !members.contains(&task_move.board_id) {
                return Err(TaskMoveError::ForeignBoard(task_move.board_id));
            }
        }

        for task_move in moves {
            sqlx::query(
                "UPDATE tasks SET board_id = $2, position = $3, updated_at = NOW() WHERE id = $1",
            )
            .bind(task_move.id)
            .bind(task_move.board_id)
            .bind(task_move.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
