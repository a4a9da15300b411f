// Public API - what other modules can use
pub use handlers::{create_room, get_messages, join_room, send_message};

// Internal modules
pub mod cleanup_task;
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
