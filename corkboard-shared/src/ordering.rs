/// Position allocation and reindexing for sibling collections
///
/// Boards within a project and tasks within a board are ordered by an
/// integer `position` key. Positions are not required to be contiguous,
/// only totally ordered; reads sort by `(position, id)` so ties resolve
/// deterministically.
///
/// Two operations maintain the ordering:
///
/// - **Allocation**: a new sibling is appended after the current maximum
///   with a collection-specific gap.
/// - **Reindexing**: after a delete, every surviving sibling is rewritten
///   to a dense sequence so gaps do not shrink indefinitely. A sibling's
///   position is therefore not stable across unrelated deletions.
///
/// # Example
///
/// ```
/// use corkboard_shared::ordering::PositionScheme;
///
/// // First board of a project
/// assert_eq!(PositionScheme::BOARDS.next_position(None), 10);
/// // Appending after boards at 10 and 20
/// assert_eq!(PositionScheme::BOARDS.next_position(Some(20)), 30);
///
/// // Two tasks survive a delete: they land at 10 and 20
/// let positions: Vec<i32> = PositionScheme::TASKS.reindex(2).collect();
/// assert_eq!(positions, vec![10, 20]);
/// ```

use serde::{Deserialize, Serialize};

/// Ordering parameters of one sibling collection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionScheme {
    /// Gap added past the current maximum when appending a new sibling
    pub creation_gap: i32,

    /// Multiplier applied to the 1-based rank when reindexing after a delete
    pub reindex_step: i32,
}

impl PositionScheme {
    /// Boards: append at max+10 (10 for the first board), reindex to 1, 2, 3, …
    pub const BOARDS: PositionScheme = PositionScheme {
        creation_gap: 10,
        reindex_step: 1,
    };

    /// Tasks: append at max+1 (1 for the first task), reindex to 10, 20, 30, …
    pub const TASKS: PositionScheme = PositionScheme {
        creation_gap: 1,
        reindex_step: 10,
    };

    /// Computes the position for a newly created sibling
    ///
    /// `current_max` is the largest position among existing siblings, or
    /// `None` for an empty collection. The gap leaves headroom for manual
    /// insertion between siblings without immediate renumbering.
    pub fn next_position(&self, current_max: Option<i32>) -> i32 {
        current_max.unwrap_or(0) + self.creation_gap
    }

    /// Yields the dense position sequence for `count` surviving siblings
    ///
    /// Callers zip this with the siblings ordered by their pre-delete
    /// `(position, id)` order, so the relative order never changes.
    pub fn reindex(&self, count: usize) -> impl Iterator<Item = i32> {
        let step = self.reindex_step;
        (1..=count as i32).map(move |rank| rank * step)
    }
}
