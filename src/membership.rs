use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete as delete_route, get, post},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    AppState,
    error::{ApiError, ApiResult, on_unique_violation},
    rooms::Room,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_member))
        .route("/{user_id}", get(user_rooms))
        .route("/remove", delete_route(remove_member))
}

/// Join a user to a room in one statement. The guarded INSERT..SELECT inserts
/// nothing when either side is missing, and the composite primary key rejects
/// a second join, so there is no check-then-act window.
pub async fn add(db_pool: &SqlitePool, user_id: i64, room_id: i64) -> ApiResult<()> {
    let result = sqlx::query(
        "INSERT INTO user_rooms (user_id, room_id) \
         SELECT ?1, ?2 \
         WHERE EXISTS (SELECT 1 FROM users WHERE user_id = ?1) \
           AND EXISTS (SELECT 1 FROM rooms WHERE room_id = ?2)",
    )
    .bind(user_id)
    .bind(room_id)
    .execute(db_pool)
    .await
    .map_err(|err| {
        on_unique_violation(err, ApiError::Conflict("user is already a member of the room"))
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("user or room not found"));
    }
    Ok(())
}

pub async fn remove(db_pool: &SqlitePool, user_id: i64, room_id: i64) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM user_rooms WHERE user_id = ? AND room_id = ?")
        .bind(user_id)
        .bind(room_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("user is not a member of the room"));
    }
    Ok(())
}

pub async fn rooms_for_user(db_pool: &SqlitePool, user_id: i64) -> ApiResult<Vec<Room>> {
    Ok(sqlx::query_as(
        "SELECT r.room_id, r.room_name \
         FROM rooms r \
         JOIN user_rooms ur ON r.room_id = ur.room_id \
         WHERE ur.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?)
}

#[derive(Deserialize)]
struct MembershipBody {
    user_id: Option<i64>,
    room_id: Option<i64>,
}

impl MembershipBody {
    fn ids(&self) -> ApiResult<(i64, i64)> {
        match (self.user_id, self.room_id) {
            (Some(user_id), Some(room_id)) => Ok((user_id, room_id)),
            _ => Err(ApiError::Validation("user ID and room ID are required")),
        }
    }
}

#[debug_handler]
async fn add_member(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<MembershipBody>,
) -> ApiResult<Response> {
    let (user_id, room_id) = body.ids()?;
    add(&db_pool, user_id, room_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user added to the room" })),
    )
        .into_response())
}

#[debug_handler]
async fn user_rooms(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(rooms_for_user(&db_pool, user_id).await?))
}

#[debug_handler]
async fn remove_member(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<MembershipBody>,
) -> ApiResult<Response> {
    let (user_id, room_id) = body.ids()?;
    remove(&db_pool, user_id, room_id).await?;
    Ok(Json(json!({ "message": "user removed from the room" })).into_response())
}
