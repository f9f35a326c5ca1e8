use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::task::{Task, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

/// Errors from the task repository
#[derive(Debug, Error)]
pub enum TaskError {
    /// Missing row and not-owned row are deliberately indistinguishable so
    /// the existence of another user's task cannot be inferred
    #[error("Task not found")]
    NotFound,

    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Sort field for list queries. Parsed from a client-supplied string;
/// anything unrecognized falls back to creation time. SQL column names are
/// only ever produced from these variants, never from the raw parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("updated_at") => SortField::UpdatedAt,
            Some("title") => SortField::Title,
            _ => SortField::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for the list operation. All supplied filters apply conjunctively.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

fn validate_fields(title: &str, description: Option<&str>) -> Result<(), TaskError> {
    if title.is_empty() {
        return Err(TaskError::Validation {
            field: "title",
            message: "Title must not be empty".to_string(),
        });
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TaskError::Validation {
            field: "title",
            message: format!("Title must be at most {} characters", TITLE_MAX_CHARS),
        });
    }
    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(TaskError::Validation {
                field: "description",
                message: format!(
                    "Description must be at most {} characters",
                    DESCRIPTION_MAX_CHARS
                ),
            });
        }
    }
    Ok(())
}

/// Insert a new task owned by `owner_id`. Both timestamps are set from a
/// single clock read so `created_at == updated_at` on a fresh task.
pub async fn create(
    pool: &PgPool,
    owner_id: &str,
    title: &str,
    description: Option<&str>,
) -> Result<Task, TaskError> {
    validate_fields(title, description)?;

    let now = Utc::now();
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, FALSE, $5, $5) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// List the owner's tasks with optional completion filter, case-insensitive
/// substring search over title OR description, and requested ordering.
pub async fn list(pool: &PgPool, owner_id: &str, opts: &ListOptions) -> Result<Vec<Task>, TaskError> {
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let mut bind_index = 1;

    if opts.completed.is_some() {
        bind_index += 1;
        sql.push_str(&format!(" AND completed = ${}", bind_index));
    }
    if opts.search.is_some() {
        bind_index += 1;
        sql.push_str(&format!(
            " AND (title ILIKE ${i} OR description ILIKE ${i})",
            i = bind_index
        ));
    }
    sql.push_str(&format!(
        " ORDER BY {} {}",
        opts.sort.column(),
        opts.order.keyword()
    ));

    let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
    if let Some(completed) = opts.completed {
        query = query.bind(completed);
    }
    if let Some(search) = &opts.search {
        query = query.bind(format!("%{}%", search));
    }

    let tasks = query.fetch_all(pool).await?;
    Ok(tasks)
}

/// Fetch one task iff it exists AND is owned by `owner_id`.
pub async fn get(pool: &PgPool, owner_id: &str, task_id: &str) -> Result<Task, TaskError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    task.ok_or(TaskError::NotFound)
}

/// Full replace of title and description; refreshes `updated_at`, leaves
/// `completed` untouched.
pub async fn update(
    pool: &PgPool,
    owner_id: &str,
    task_id: &str,
    title: &str,
    description: Option<&str>,
) -> Result<Task, TaskError> {
    validate_fields(title, description)?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET title = $3, description = $4, updated_at = $5 \
         WHERE id = $1 AND user_id = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    task.ok_or(TaskError::NotFound)
}

/// Remove the task permanently. No tombstone.
pub async fn delete(pool: &PgPool, owner_id: &str, task_id: &str) -> Result<(), TaskError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TaskError::NotFound);
    }
    Ok(())
}

/// Set the completion flag. `updated_at` is refreshed even when the value is
/// unchanged.
pub async fn set_completed(
    pool: &PgPool,
    owner_id: &str,
    task_id: &str,
    completed: bool,
) -> Result<Task, TaskError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET completed = $3, updated_at = $4 \
         WHERE id = $1 AND user_id = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(owner_id)
    .bind(completed)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    task.ok_or(TaskError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_field_falls_back_to_created_at() {
        assert_eq!(SortField::parse(Some("title")), SortField::Title);
        assert_eq!(SortField::parse(Some("updated_at")), SortField::UpdatedAt);
        assert_eq!(SortField::parse(Some("owner_id")), SortField::CreatedAt);
        assert_eq!(SortField::parse(None), SortField::CreatedAt);
    }

    #[test]
    fn unknown_sort_order_falls_back_to_desc() {
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("descending")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn empty_title_fails_validation() {
        let err = validate_fields("", None).unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "title", .. }));
    }

    #[test]
    fn oversized_fields_fail_validation() {
        let long_title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(validate_fields(&long_title, None).is_err());

        let long_description = "x".repeat(DESCRIPTION_MAX_CHARS + 1);
        let err = validate_fields("ok", Some(&long_description)).unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "description", .. }));
    }

    #[test]
    fn boundary_lengths_pass_validation() {
        let title = "x".repeat(TITLE_MAX_CHARS);
        let description = "y".repeat(DESCRIPTION_MAX_CHARS);
        assert!(validate_fields(&title, Some(&description)).is_ok());
        assert!(validate_fields("a", None).is_ok());
    }
}
