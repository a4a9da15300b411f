use serde::{Deserialize, Serialize};

use super::models::Message;

/// Request payload for joining a room.
/// A missing room_id maps to not-found, never a deserialization error.
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: Option<String>,
}

/// Request payload for posting a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub room_id: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
}

/// Query parameters for polling messages. `after` stays a raw string so a
/// non-numeric value normalizes to 0 instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct GetMessagesQuery {
    pub room_id: Option<String>,
    pub after: Option<String>,
}

/// Response for room creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Response for a successful join
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub ok: bool,
    pub room_id: String,
}

/// Response for a successful send
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub ok: bool,
}

/// One page of messages plus the offset for the client's next poll
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub next_index: usize,
}
