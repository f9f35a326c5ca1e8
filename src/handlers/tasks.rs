use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use super::extract::ApiQuery;
use crate::auth::{authorize, ActionKind, Identity};
use crate::database::manager::DatabaseManager;
use crate::database::repository::{self, ListOptions, SortField, SortOrder};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTask {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by completion status
    pub completed: Option<bool>,
    /// Case-insensitive substring match against title or description
    pub search: Option<String>,
    /// Sort field: created_at (default), updated_at, title
    pub sort: Option<String>,
    /// Sort order: asc, desc (default)
    pub order: Option<String>,
}

/// POST /api/:user_id/tasks - create a task for the authenticated user
pub async fn task_create(
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateTask>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::Create)?;

    let pool = DatabaseManager::pool().await?;
    let task = repository::create(&pool, &user_id, &body.title, body.description.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/:user_id/tasks - list tasks with optional filters
pub async fn task_list(
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::List)?;

    let opts = ListOptions {
        completed: query.completed,
        search: query.search,
        sort: SortField::parse(query.sort.as_deref()),
        order: SortOrder::parse(query.order.as_deref()),
    };

    let pool = DatabaseManager::pool().await?;
    let tasks = repository::list(&pool, &user_id, &opts).await?;

    Ok(Json(tasks))
}

/// GET /api/:user_id/tasks/:task_id - fetch a single task
pub async fn task_get(
    Extension(identity): Extension<Identity>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::Get)?;

    let pool = DatabaseManager::pool().await?;
    let task = repository::get(&pool, &user_id, &task_id).await?;

    Ok(Json(task))
}

/// PUT /api/:user_id/tasks/:task_id - replace title and description
pub async fn task_update(
    Extension(identity): Extension<Identity>,
    Path((user_id, task_id)): Path<(String, String)>,
    Json(body): Json<UpdateTask>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::Update)?;

    let pool = DatabaseManager::pool().await?;
    let task = repository::update(
        &pool,
        &user_id,
        &task_id,
        &body.title,
        body.description.as_deref(),
    )
    .await?;

    Ok(Json(task))
}

/// DELETE /api/:user_id/tasks/:task_id - remove permanently
pub async fn task_delete(
    Extension(identity): Extension<Identity>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::Delete)?;

    let pool = DatabaseManager::pool().await?;
    repository::delete(&pool, &user_id, &task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/:user_id/tasks/:task_id/complete - set completion status
pub async fn task_complete(
    Extension(identity): Extension<Identity>,
    Path((user_id, task_id)): Path<(String, String)>,
    Json(body): Json<CompleteTask>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user_id, &identity, ActionKind::Complete)?;

    let pool = DatabaseManager::pool().await?;
    let task = repository::set_completed(&pool, &user_id, &task_id, body.completed).await?;

    Ok(Json(task))
}
