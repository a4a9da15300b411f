use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument, warn};

use super::repository::RoomRepository;
use crate::shared::AppError;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a room must go without a new message before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(30 * 60), // 30 minutes
            inactivity_threshold: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Starts the background task that periodically evicts inactive rooms.
/// Optional: the base contract keeps rooms for the process lifetime, this
/// only bounds memory growth on long-running deployments.
#[instrument(skip(room_repository))]
pub async fn start_cleanup_task(
    room_repository: Arc<dyn RoomRepository + Send + Sync>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        info!("Running room cleanup task");

        match cleanup_inactive_rooms(&room_repository, config.inactivity_threshold).await {
            Ok(deleted_count) => {
                info!(deleted_count = deleted_count, "Room cleanup completed");
            }
            Err(e) => {
                error!(error = %e, "Room cleanup task failed");
            }
        }
    }
}

/// Deletes rooms that have been inactive for longer than the threshold
#[instrument(skip(room_repository))]
async fn cleanup_inactive_rooms(
    room_repository: &Arc<dyn RoomRepository + Send + Sync>,
    inactivity_threshold: Duration,
) -> Result<usize, AppError> {
    let inactive_room_ids = room_repository
        .inactive_room_ids(inactivity_threshold)
        .await?;

    if inactive_room_ids.is_empty() {
        info!("No inactive rooms to clean up");
        return Ok(0);
    }

    info!(
        count = inactive_room_ids.len(),
        "Found inactive rooms to delete"
    );

    let mut deleted_count = 0;

    for room_id in inactive_room_ids {
        match room_repository.delete_room(&room_id).await {
            Ok(()) => {
                deleted_count += 1;
                info!(room_id = %room_id, "Deleted inactive room");
            }
            Err(e) => {
                warn!(
                    room_id = %room_id,
                    error = %e,
                    "Failed to delete inactive room"
                );
            }
        }
    }

    Ok(deleted_count)
}
