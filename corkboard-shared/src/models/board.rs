/// Board model and database operations
///
/// Boards are the ordered columns of a project. Their `position` keys are
/// allocated with a gap of 10 on creation and rewritten to a dense `1, 2,
/// 3, …` sequence after every delete (see [`crate::ordering`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::ordering::PositionScheme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Owning project; never changes after creation
    pub project_id: Uuid,

    /// Human-readable board name
    pub name: String,

    /// Ordering key among sibling boards; lower sorts first
    pub position: i32,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Owning project
    pub project_id: Uuid,

    /// Board name
    pub name: String,

    /// Position from the allocator (see [`PositionScheme::BOARDS`])
    pub position: i32,
}

/// One entry of a bulk reorder request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Board to move
    pub id: Uuid,

    /// New ordering key
    pub position: i32,
}

/// Error type for the bulk reorder operation
#[derive(Debug, thiserror::Error)]
pub enum BulkPositionError {
    /// A supplied board is not part of the target project
    #[error("Board {0} does not belong to the project")]
    ForeignBoard(Uuid),

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Board {
    /// Creates a new board at the given position
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (project_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, name, position, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, project_id, name, position, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists a project's boards ordered by position (ties resolve by id)
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, project_id, name, position, created_at, updated_at
            FROM boards
            WHERE project_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Lists the boards of several projects in one query, ordered by position
    ///
    /// Used to assemble nested project listings without a query per project.
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, project_id, name, position, created_at, updated_at
            FROM boards
            WHERE project_id = ANY($1)
            ORDER BY position, id
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Largest position among a project's boards, None when the project has none
    ///
    /// Input to the position allocator on creation.
    pub async fn max_position(pool: &PgPool, project_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(position) FROM boards WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(max)
    }

    /// Renames a board
    pub async fn update_name(
        pool: &PgPool,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Deletes a board; its tasks go with it via cascade
    ///
    /// Callers must reindex the surviving siblings afterwards.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrites every surviving board's position to the dense `1, 2, 3, …` sequence
    ///
    /// Runs after a delete. The relative order of survivors (by pre-delete
    /// `(position, id)`) is preserved; their absolute positions are not.
    pub async fn reindex_positions(pool: &PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM boards WHERE project_id = $1 ORDER BY position, id",
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;

        let count = ids.len();
        for (id, position) in ids.into_iter().zip(PositionScheme::BOARDS.reindex(count)) {
            sqlx::query("UPDATE boards SET position = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Applies a bulk reorder, all-or-nothing
    ///
    /// Membership of every supplied board in the project is checked before
    /// any write; one foreign board fails the whole request and no position
    /// changes. Updates land in a single transaction.
    pub async fn update_positions(
        pool: &PgPool,
        project_id: Uuid,
        updates: &[PositionUpdate],
    ) -> Result<(), BulkPositionError> {
        let mut tx = pool.begin().await?;

        let members: HashSet<Uuid> =
            sqlx::query_scalar("SELECT id FROM boards WHERE project_id = $1")
                .bind(project_id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        for update in updates {
            if !members.contains(&update.id) {
                return Err(BulkPositionError::ForeignBoard(update.id));
            }
        }

        for update in updates {
            sqlx::query("UPDATE boards SET position = $2, updated_at = NOW() WHERE id = $1")
                .bind(update.id)
                .bind(update.position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
