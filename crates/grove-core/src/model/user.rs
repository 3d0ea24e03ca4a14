use crate::model::id::EntityId;
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// `points` only grows through completions; administrative edits may adjust
/// it out-of-band, so it is read back from the store rather than derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub points: i64,
    pub group_id: Option<EntityId>,
    #[serde(default)]
    pub favorite_tasks: Vec<EntityId>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at_us: i64,
}
