use chrono::{DateTime, Utc};
use serde::Serialize;

/// A todo item. The sole persisted entity.
///
/// `id` and `user_id` are immutable after creation; `user_id` is never taken
/// from a request body, only from the authenticated identity. This struct is
/// serialized directly as the API resource representation, so it carries no
/// internal-only fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Absent (null) is distinct from empty
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
