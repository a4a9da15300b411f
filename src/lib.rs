// Library crate for the room-based chat relay server
// This file exposes the public API for integration tests

pub mod room;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use room::{models::Message, models::RoomModel, repository::RoomRepository};
pub use shared::{AppError, AppState};

use axum::{
    routing::{get, post},
    Router,
};

/// Builds the chat relay router over the given application state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create_room", post(room::create_room))
        .route("/join_room", post(room::join_room))
        .route("/send_message", post(room::send_message))
        .route("/get_messages", get(room::get_messages))
        .with_state(state)
}
