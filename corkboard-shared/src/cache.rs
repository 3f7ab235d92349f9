/// Time-bounded read cache for task lists
///
/// Listing the tasks of a board is by far the hottest read path, so the
/// ordered list is cached per board for a short TTL. Correctness does not
/// rest on the TTL: every writer that touches a board's task list calls
/// `invalidate` before reporting success, so a reader never observes state
/// older than the last write. The TTL only bounds how long an entry can sit
/// unused.
///
/// The clock is injected so expiry is testable without sleeping.
///
/// # Example
///
/// ```
/// use corkboard_shared::cache::{TaskListCache, TaskListKey};
/// use std::time::Duration;
/// use uuid::Uuid;
///
/// let cache = TaskListCache::new(Duration::from_secs(60));
/// let key = TaskListKey {
///     project_id: Uuid::new_v4(),
///     board_id: Uuid::new_v4(),
/// };
///
/// assert!(cache.get(&key).is_none());
/// cache.put(key, vec![]);
/// assert!(cache.get(&key).is_some());
/// cache.invalidate(&key);
/// assert!(cache.get(&key).is_none());
/// ```

use crate::models::task::Task;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default time-to-live for a cached task list
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Source of the current time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by the system monotonic clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache key: a board's task list, scoped by its project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskListKey {
    pub project_id: Uuid,
    pub board_id: Uuid,
}

struct CacheEntry {
    tasks: Vec<Task>,
    stored_at: Instant,
}

/// Per-board cache of ordered task lists
pub struct TaskListCache {
    entries: RwLock<HashMap<TaskListKey, CacheEntry>>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl TaskListCache {
    /// Creates a cache with the given TTL, using the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    /// Creates a cache with an explicit clock (used by tests with a fake clock)
    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the cached list if present and within its TTL
    ///
    /// Expired entries are evicted on the way out.
    pub fn get(&self, key: &TaskListKey) -> Option<Vec<Task>> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(key) {
                Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                    return Some(entry.tasks.clone());
                }
                Some(_) => {} // expired, evict below
                None => return None,
            }
        }

        self.entries
            .write()
            .expect("cache lock poisoned")
            .remove(key);
        None
    }

    /// Stores a freshly computed list with a full TTL
    pub fn put(&self, key: TaskListKey, tasks: Vec<Task>) {
        let entry = CacheEntry {
            tasks,
            stored_at: self.clock.now(),
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, entry);
    }

    /// Drops the entry for a board
    ///
    /// Writers call this before returning success; a concurrent reader that
    /// misses here recomputes from the database and stores the fresh list.
    pub fn invalidate(&self, key: &TaskListKey) {
        self.entries
            .write()
            .expect("cache lock poisoned")
            .remove(key);
    }
}

impl std::fmt::Debug for TaskListCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("TaskListCache")
            .field("entries", &len)
            .field("ttl", &self.ttl)
            .finish()
    }
}
