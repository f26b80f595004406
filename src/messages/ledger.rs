use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::{ApiError, ApiResult};

use super::cursor::Cursor;

/// One row of room history, joined against the identity store. Timestamps
/// are fixed-width UTC text assigned by the storage clock at insert time, so
/// lexicographic order is chronological order and ties (same millisecond)
/// fall back to `message_id`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MessageView {
    pub message_id: i64,
    pub sender: String,
    pub message_text: String,
    pub timestamp: String,
}

pub async fn send(
    db_pool: &SqlitePool,
    sender_id: i64,
    room_id: i64,
    text: &str,
) -> ApiResult<i64> {
    if text.is_empty() {
        return Err(ApiError::Validation(
            "sender ID, room ID, and message text are required",
        ));
    }

    // No sender/room existence check here: the room foreign key surfaces as
    // a storage error, and the sender reference is deliberately weak.
    let result = sqlx::query(
        "INSERT INTO messages (sender_id, room_id, message_text, timestamp) \
         VALUES (?, ?, ?, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
    )
    .bind(sender_id)
    .bind(room_id)
    .bind(text)
    .execute(db_pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Room history ordered by `(timestamp, message_id)`. Defaults to the full
/// history; a cursor and/or limit make the read resumable.
pub async fn list_by_room(
    db_pool: &SqlitePool,
    room_id: i64,
    after: Option<&Cursor>,
    limit: Option<i64>,
) -> ApiResult<Vec<MessageView>> {
    let mut sql = String::from(
        "SELECT m.message_id, u.username AS sender, m.message_text, m.timestamp \
         FROM messages m \
         JOIN users u ON m.sender_id = u.user_id \
         WHERE m.room_id = ?",
    );
    if after.is_some() {
        sql.push_str(" AND (m.timestamp, m.message_id) > (?, ?)");
    }
    sql.push_str(" ORDER BY m.timestamp, m.message_id");
    if limit.is_some() {
        sql.push_str(" LIMIT ?");
    }

    let mut query = sqlx::query_as::<_, MessageView>(&sql).bind(room_id);
    if let Some(cursor) = after {
        query = query.bind(&cursor.timestamp).bind(cursor.message_id);
    }
    if let Some(limit) = limit {
        query = query.bind(limit);
    }

    Ok(query.fetch_all(db_pool).await?)
}

/// Single conditional delete; the affected-row count is the existence check.
pub async fn delete_by_id(db_pool: &SqlitePool, message_id: i64) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
        .bind(message_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("message not found"));
    }
    Ok(())
}

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    sender_id: Option<i64>,
    room_id: Option<i64>,
    #[serde(default)]
    message_text: String,
}

#[debug_handler]
pub(crate) async fn send_message(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<SendMessageBody>,
) -> ApiResult<Response> {
    let (Some(sender_id), Some(room_id)) = (body.sender_id, body.room_id) else {
        return Err(ApiError::Validation(
            "sender ID, room ID, and message text are required",
        ));
    };
    let message_id = send(&db_pool, sender_id, room_id, &body.message_text).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message_id": message_id })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub(crate) struct HistoryQuery {
    cursor: Option<String>,
    limit: Option<i64>,
}

#[debug_handler]
pub(crate) async fn room_messages(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<i64>,
    Query(params): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<MessageView>>> {
    let after = params.cursor.as_deref().map(Cursor::decode).transpose()?;
    Ok(Json(
        list_by_room(&db_pool, room_id, after.as_ref(), params.limit).await?,
    ))
}

#[debug_handler]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    Path(message_id): Path<i64>,
) -> ApiResult<Response> {
    delete_by_id(&db_pool, message_id).await?;
    Ok(Json(json!({ "message": "message deleted" })).into_response())
}
