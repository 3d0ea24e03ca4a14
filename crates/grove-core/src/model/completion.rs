use crate::model::id::EntityId;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};

/// An immutable record of a user finishing a task inside one eligibility
/// window.
///
/// `points_earned` is a snapshot of the task's point value at completion
/// time; a later edit to the task never rewrites history. `window_start_us`
/// is the derived period key that backs the uniqueness constraint (one
/// completion per task, user, and window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: EntityId,
    pub task_id: EntityId,
    pub user_id: EntityId,
    pub group_id: Option<EntityId>,
    pub completed_at_us: i64,
    pub window_start_us: i64,
    pub points_earned: u32,
}

/// A completion joined with its task for feed-style listings.
///
/// `task` is `None` when the task row has since been removed; callers fall
/// back to the snapshotted `points_earned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDetail {
    #[serde(flatten)]
    pub completion: Completion,
    pub task: Option<Task>,
}
