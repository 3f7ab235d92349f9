/// Database models for Corkboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: account identities
/// - `project`: top-level containers, owned by exactly one user
/// - `board`: ordered columns of a project
/// - `task`: ordered cards on a board
///
/// # Example
///
/// ```no_run
/// use corkboard_shared::models::project::{CreateProject, Project};
/// use corkboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     owner_id: Uuid::new_v4(),
///     name: "Roadmap".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod project;
pub mod task;
pub mod user;
