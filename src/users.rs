use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    AppState,
    error::{ApiError, ApiResult, on_unique_violation},
};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).delete(delete_user))
}

pub async fn create(db_pool: &SqlitePool, username: &str) -> ApiResult<i64> {
    if username.is_empty() {
        return Err(ApiError::Validation("username is required"));
    }

    let result = sqlx::query("INSERT INTO users (username) VALUES (?)")
        .bind(username)
        .execute(db_pool)
        .await
        .map_err(|err| on_unique_violation(err, ApiError::Conflict("username already taken")))?;

    Ok(result.last_insert_rowid())
}

pub async fn get_by_id(db_pool: &SqlitePool, user_id: i64) -> ApiResult<User> {
    sqlx::query_as("SELECT user_id, username FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(ApiError::NotFound("user not found"))
}

pub async fn list(db_pool: &SqlitePool) -> ApiResult<Vec<User>> {
    Ok(
        sqlx::query_as("SELECT user_id, username FROM users ORDER BY user_id")
            .fetch_all(db_pool)
            .await?,
    )
}

pub async fn delete(db_pool: &SqlitePool, user_id: i64) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(user_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("user not found"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct CreateUserBody {
    #[serde(default)]
    username: String,
}

#[debug_handler]
async fn create_user(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<Response> {
    let user_id = create(&db_pool, &body.username).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user_id }))).into_response())
}

#[debug_handler]
async fn list_users(State(db_pool): State<SqlitePool>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(list(&db_pool).await?))
}

#[debug_handler]
async fn get_user(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(get_by_id(&db_pool, id).await?))
}

#[debug_handler]
async fn delete_user(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    delete(&db_pool, id).await?;
    Ok(Json(json!({ "message": "user deleted" })).into_response())
}
