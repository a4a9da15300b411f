use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::models::{Message, RoomModel};
use crate::shared::AppError;

/// Result of attempting to register a new room
#[derive(Debug, Clone)]
pub enum CreateRoomResult {
    /// Room registered under its generated id
    Created,
    /// The generated id collided with an existing room; caller should retry
    AlreadyExists,
}

/// Result of attempting to append a message to a room
#[derive(Debug, Clone)]
pub enum AppendMessageResult {
    /// Message stored, returns the new message count
    Appended(usize),
    /// Room does not exist
    RoomNotFound,
}

/// Result of reading a room's messages from an offset
#[derive(Debug, Clone)]
pub enum FetchMessagesResult {
    /// Messages from the clamped offset onward, plus the offset for the next poll
    Messages {
        messages: Vec<Message>,
        next_index: usize,
    },
    /// Room does not exist
    RoomNotFound,
}

/// Trait for room store operations
#[async_trait]
pub trait RoomRepository {
    async fn create_room(&self, room: &RoomModel) -> Result<CreateRoomResult, AppError>;

    /// Pure existence check, no side effects
    async fn room_exists(&self, room_id: &str) -> Result<bool, AppError>;

    /// Atomically looks up the room and appends under a single lock
    /// acquisition, so a concurrent poll observes either the whole message
    /// or nothing (no torn reads of the sequence)
    async fn append_message(
        &self,
        room_id: &str,
        message: Message,
    ) -> Result<AppendMessageResult, AppError>;

    /// Atomically reads all messages from `offset` to the end. An offset past
    /// the end is clamped and yields an empty slice, not an error.
    async fn messages_since(
        &self,
        room_id: &str,
        offset: usize,
    ) -> Result<FetchMessagesResult, AppError>;

    /// Ids of rooms whose last activity is older than the threshold
    async fn inactive_room_ids(&self, threshold: Duration) -> Result<Vec<String>, AppError>;

    async fn delete_room(&self, room_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of RoomRepository; the only implementation,
/// since room state is process-lifetime by design
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room))]
    async fn create_room(&self, room: &RoomModel) -> Result<CreateRoomResult, AppError> {
        debug!(room_id = %room.id, "Creating room in memory");

        let mut rooms = self.rooms.lock().unwrap();
        if rooms.contains_key(&room.id) {
            warn!(room_id = %room.id, "Room id already taken");
            return Ok(CreateRoomResult::AlreadyExists);
        }
        rooms.insert(room.id.clone(), room.clone());

        debug!(room_id = %room.id, "Room created successfully in memory");
        Ok(CreateRoomResult::Created)
    }

    #[instrument(skip(self))]
    async fn room_exists(&self, room_id: &str) -> Result<bool, AppError> {
        let rooms = self.rooms.lock().unwrap();
        let exists = rooms.contains_key(room_id);

        debug!(room_id = %room_id, exists = exists, "Room existence checked");
        Ok(exists)
    }

    #[instrument(skip(self, message))]
    async fn append_message(
        &self,
        room_id: &str,
        message: Message,
    ) -> Result<AppendMessageResult, AppError> {
        debug!(room_id = %room_id, author = %message.author, "Appending message");

        let mut rooms = self.rooms.lock().unwrap();

        // Get the room or return RoomNotFound
        let room = match rooms.get_mut(room_id) {
            Some(room) => room,
            None => {
                debug!(room_id = %room_id, "Room not found");
                return Ok(AppendMessageResult::RoomNotFound);
            }
        };

        room.push_message(message);
        let count = room.message_count();

        info!(
            room_id = %room_id,
            message_count = count,
            "Message appended successfully (atomic)"
        );

        Ok(AppendMessageResult::Appended(count))
    }

    #[instrument(skip(self))]
    async fn messages_since(
        &self,
        room_id: &str,
        offset: usize,
    ) -> Result<FetchMessagesResult, AppError> {
        let rooms = self.rooms.lock().unwrap();

        let room = match rooms.get(room_id) {
            Some(room) => room,
            None => {
                debug!(room_id = %room_id, "Room not found");
                return Ok(FetchMessagesResult::RoomNotFound);
            }
        };

        let messages = room.messages_from(offset);
        let next_index = room.message_count();

        debug!(
            room_id = %room_id,
            offset = offset,
            returned = messages.len(),
            next_index = next_index,
            "Messages fetched"
        );

        Ok(FetchMessagesResult::Messages {
            messages,
            next_index,
        })
    }

    #[instrument(skip(self))]
    async fn inactive_room_ids(&self, threshold: Duration) -> Result<Vec<String>, AppError> {
        let threshold = chrono::Duration::from_std(threshold).map_err(|_| AppError::Internal)?;
        let cutoff = chrono::Utc::now() - threshold;

        let rooms = self.rooms.lock().unwrap();
        let inactive: Vec<String> = rooms
            .values()
            .filter(|room| room.last_activity_at < cutoff)
            .map(|room| room.id.clone())
            .collect();

        debug!(count = inactive.len(), "Inactive rooms collected");
        Ok(inactive)
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: &str) -> Result<(), AppError> {
        let mut rooms = self.rooms.lock().unwrap();

        if rooms.remove(room_id).is_none() {
            debug!(room_id = %room_id, "Room not found for deletion");
            return Err(AppError::RoomNotFound);
        }

        info!(room_id = %room_id, "Room deleted");
        Ok(())
    }
}
