use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback author name used when the sender gives none
pub const ANONYMOUS_AUTHOR: &str = "anon";

/// Number of hex characters in a room id
const ROOM_ID_LEN: usize = 6;

/// A single chat message, immutable once appended to a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    pub text: String,
}

impl Message {
    /// Builds a message from raw client input.
    ///
    /// Text is trimmed and must be non-empty; returns `None` otherwise.
    /// A missing or blank author falls back to [`ANONYMOUS_AUTHOR`].
    pub fn new(author: Option<&str>, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let author = match author.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => ANONYMOUS_AUTHOR.to_string(),
        };

        Some(Self {
            author,
            text: text.to_string(),
        })
    }
}

/// In-memory model for a chat room and its append-only message log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: String,                      // Short random hex token, URL-safe
    pub messages: Vec<Message>,          // Append-only, insertion order = display order
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>, // Bumped on every append, drives cleanup
}

impl RoomModel {
    /// Creates a new empty room with a generated id
    pub fn new() -> Self {
        // First six hex chars of a v4 UUID: short enough to share by hand,
        // unique enough for the room counts this server is meant for.
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ROOM_ID_LEN);

        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Current number of messages in the room
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Appends a message and records the room activity
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.last_activity_at = Utc::now();
    }

    /// Returns a copy of all messages from `offset` to the end.
    /// An offset past the end yields an empty vec, never an error.
    pub fn messages_from(&self, offset: usize) -> Vec<Message> {
        let start = offset.min(self.messages.len());
        self.messages[start..].to_vec()
    }
}

impl Default for RoomModel {
    fn default() -> Self {
        Self::new()
    }
}
