use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{Message, RoomModel},
    repository::{AppendMessageResult, CreateRoomResult, FetchMessagesResult, RoomRepository},
    types::{CreateRoomResponse, JoinRoomResponse, MessagesResponse, SendMessageResponse},
};
use crate::shared::AppError;

/// Service for handling chat room business logic
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates a new empty room with a generated id. Never fails from the
    /// client's point of view: an id collision is retried with a fresh id.
    #[instrument(skip(self))]
    pub async fn create_room(&self) -> Result<CreateRoomResponse, AppError> {
        loop {
            let room = RoomModel::new();
            debug!(room_id = %room.id, "Generated room id");

            match self.repository.create_room(&room).await? {
                CreateRoomResult::Created => {
                    info!(room_id = %room.id, "Room created successfully");
                    return Ok(CreateRoomResponse { room_id: room.id });
                }
                CreateRoomResult::AlreadyExists => {
                    warn!(room_id = %room.id, "Room id collision, regenerating");
                }
            }
        }
    }

    /// Validates that a room exists. Joining tracks no membership: any
    /// client may join any known room.
    #[instrument(skip(self))]
    pub async fn join_room(&self, room_id: Option<String>) -> Result<JoinRoomResponse, AppError> {
        let room_id = match room_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                debug!("Join request without room id");
                return Err(AppError::RoomNotFound);
            }
        };

        if !self.repository.room_exists(&room_id).await? {
            debug!(room_id = %room_id, "Join rejected, room not found");
            return Err(AppError::RoomNotFound);
        }

        info!(room_id = %room_id, "Client joined room");
        Ok(JoinRoomResponse { ok: true, room_id })
    }

    /// Appends a message to a room. The author falls back to "anon" when
    /// absent or blank; blank text is rejected without touching the room.
    #[instrument(skip(self, author, text))]
    pub async fn send_message(
        &self,
        room_id: Option<String>,
        author: Option<String>,
        text: Option<String>,
    ) -> Result<SendMessageResponse, AppError> {
        let room_id = room_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            debug!("Send request without room id");
            AppError::RoomNotFound
        })?;

        // Unknown room wins over empty text, matching the wire contract
        if !self.repository.room_exists(&room_id).await? {
            debug!(room_id = %room_id, "Send rejected, room not found");
            return Err(AppError::RoomNotFound);
        }

        let message = Message::new(author.as_deref(), text.as_deref().unwrap_or(""))
            .ok_or(AppError::EmptyMessage)?;

        match self.repository.append_message(&room_id, message).await? {
            AppendMessageResult::Appended(count) => {
                info!(room_id = %room_id, message_count = count, "Message sent");
                Ok(SendMessageResponse { ok: true })
            }
            // Room vanished between the existence check and the append
            // (cleanup task); same answer for the client either way
            AppendMessageResult::RoomNotFound => Err(AppError::RoomNotFound),
        }
    }

    /// Reads all messages from the client's offset onward. A missing or
    /// non-numeric offset polls from the start; a negative one is clamped
    /// to zero and one past the end yields an empty page.
    #[instrument(skip(self))]
    pub async fn get_messages(
        &self,
        room_id: Option<String>,
        after: Option<String>,
    ) -> Result<MessagesResponse, AppError> {
        let room_id = room_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            debug!("Poll request without room id");
            AppError::RoomNotFound
        })?;

        let offset = parse_offset(after.as_deref());

        match self.repository.messages_since(&room_id, offset).await? {
            FetchMessagesResult::Messages {
                messages,
                next_index,
            } => {
                debug!(
                    room_id = %room_id,
                    offset = offset,
                    returned = messages.len(),
                    "Messages polled"
                );
                Ok(MessagesResponse {
                    messages,
                    next_index,
                })
            }
            FetchMessagesResult::RoomNotFound => {
                debug!(room_id = %room_id, "Poll rejected, room not found");
                Err(AppError::RoomNotFound)
            }
        }
    }
}

/// Normalizes the client-supplied offset: missing, non-numeric or negative
/// values all poll from the start
fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.max(0) as usize)
        .unwrap_or(0)
}
