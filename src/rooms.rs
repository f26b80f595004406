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
    error::{ApiError, ApiResult},
};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Room {
    pub room_id: i64,
    pub room_name: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/{id}", get(get_room).put(update_room).delete(delete_room))
}

pub async fn create(db_pool: &SqlitePool, name: &str) -> ApiResult<i64> {
    if name.is_empty() {
        return Err(ApiError::Validation("room name is required"));
    }

    let result = sqlx::query("INSERT INTO rooms (room_name) VALUES (?)")
        .bind(name)
        .execute(db_pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_by_id(db_pool: &SqlitePool, room_id: i64) -> ApiResult<Room> {
    sqlx::query_as("SELECT room_id, room_name FROM rooms WHERE room_id = ?")
        .bind(room_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(ApiError::NotFound("room not found"))
}

pub async fn list(db_pool: &SqlitePool) -> ApiResult<Vec<Room>> {
    Ok(
        sqlx::query_as("SELECT room_id, room_name FROM rooms ORDER BY room_id")
            .fetch_all(db_pool)
            .await?,
    )
}

pub async fn update(db_pool: &SqlitePool, room_id: i64, name: &str) -> ApiResult<()> {
    if name.is_empty() {
        return Err(ApiError::Validation("room name is required"));
    }

    let result = sqlx::query("UPDATE rooms SET room_name = ? WHERE room_id = ?")
        .bind(name)
        .bind(room_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("room not found"));
    }
    Ok(())
}

pub async fn delete(db_pool: &SqlitePool, room_id: i64) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM rooms WHERE room_id = ?")
        .bind(room_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("room not found"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct RoomNameBody {
    #[serde(default)]
    room_name: String,
}

#[debug_handler]
async fn create_room(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<RoomNameBody>,
) -> ApiResult<Response> {
    let room_id = create(&db_pool, &body.room_name).await?;
    Ok((StatusCode::CREATED, Json(json!({ "room_id": room_id }))).into_response())
}

#[debug_handler]
async fn list_rooms(State(db_pool): State<SqlitePool>) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(list(&db_pool).await?))
}

#[debug_handler]
async fn get_room(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Room>> {
    Ok(Json(get_by_id(&db_pool, id).await?))
}

#[debug_handler]
async fn update_room(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(body): Json<RoomNameBody>,
) -> ApiResult<Response> {
    update(&db_pool, id, &body.room_name).await?;
    Ok(Json(json!({ "message": "room updated" })).into_response())
}

#[debug_handler]
async fn delete_room(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    delete(&db_pool, id).await?;
    Ok(Json(json!({ "message": "room deleted" })).into_response())
}
