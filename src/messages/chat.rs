use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::ApiResult;

use super::cursor::Cursor;

/// Number of physical chat shards.
pub const SHARD_COUNT: i64 = 2;

/// Upper bound on rows returned by a single `fetch_chat` call.
pub const CHAT_PAGE_SIZE: usize = 100;

/// Deterministic routing key: `|room_id mod SHARD_COUNT|`. All traffic for a
/// room lands on one shard.
pub fn shard_key(room_id: i64) -> i64 {
    (room_id % SHARD_COUNT).abs()
}

fn shard_table(shard: i64) -> &'static str {
    if shard == 0 {
        "chat_messages_0"
    } else {
        "chat_messages_1"
    }
}

/// Raw shard row. Unlike the ledger view there is no username join; the
/// chat path projects exactly what the shard stores.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ChatRow {
    pub message_id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub message_text: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ChatPage {
    pub rows: Vec<ChatRow>,
    pub next_cursor: Option<String>,
}

pub async fn send_chat(
    db_pool: &SqlitePool,
    room_id: i64,
    sender_id: i64,
    text: &str,
) -> ApiResult<()> {
    let shard = shard_key(room_id);
    let sql = format!(
        "INSERT INTO {} (room_id, sender_id, message_text, timestamp) \
         VALUES (?, ?, ?, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
        shard_table(shard),
    );
    sqlx::query(&sql)
        .bind(room_id)
        .bind(sender_id)
        .bind(text)
        .execute(db_pool)
        .await?;

    tracing::debug!(room_id, shard, "chat message stored");
    Ok(())
}

/// Bounded page of chat history from the room's shard, oldest first. Returns
/// a continuation cursor when more rows remain past the page boundary.
pub async fn fetch_chat(
    db_pool: &SqlitePool,
    room_id: i64,
    after: Option<&Cursor>,
) -> ApiResult<ChatPage> {
    let shard = shard_key(room_id);
    let mut sql = format!(
        "SELECT message_id, room_id, sender_id, message_text, timestamp \
         FROM {} WHERE room_id = ?",
        shard_table(shard),
    );
    if after.is_some() {
        sql.push_str(" AND (timestamp, message_id) > (?, ?)");
    }
    sql.push_str(" ORDER BY timestamp, message_id LIMIT ?");

    let mut query = sqlx::query_as::<_, ChatRow>(&sql).bind(room_id);
    if let Some(cursor) = after {
        query = query.bind(&cursor.timestamp).bind(cursor.message_id);
    }
    let mut rows = query
        .bind(CHAT_PAGE_SIZE as i64 + 1)
        .fetch_all(db_pool)
        .await?;

    let next_cursor = if rows.len() > CHAT_PAGE_SIZE {
        rows.truncate(CHAT_PAGE_SIZE);
        rows.last().map(|row| {
            Cursor {
                timestamp: row.timestamp.clone(),
                message_id: row.message_id,
            }
            .encode()
        })
    } else {
        None
    };

    Ok(ChatPage { rows, next_cursor })
}

#[derive(Deserialize)]
pub(crate) struct SendChatBody {
    room_id: i64,
    sender_id: i64,
    message_text: String,
}

#[debug_handler]
pub(crate) async fn send_chat_message(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<SendChatBody>,
) -> ApiResult<Response> {
    send_chat(&db_pool, body.room_id, body.sender_id, &body.message_text).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "chat message stored" })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub(crate) struct ChatQuery {
    cursor: Option<String>,
}

#[debug_handler]
pub(crate) async fn room_chat_messages(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<i64>,
    Query(params): Query<ChatQuery>,
) -> ApiResult<Json<ChatPage>> {
    let after = params.cursor.as_deref().map(Cursor::decode).transpose()?;
    Ok(Json(fetch_chat(&db_pool, room_id, after.as_ref()).await?))
}
