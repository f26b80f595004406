pub mod chat;
pub mod cursor;
pub mod ledger;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(ledger::send_message))
        .route("/room/{id}", get(ledger::room_messages))
        .route("/{message_id}", delete(ledger::delete_message))
        .route("/chat-messages", post(chat::send_chat_message))
        .route("/chat-messages/{room_id}", get(chat::room_chat_messages))
}
