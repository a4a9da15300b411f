use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restchat::room::cleanup_task::{start_cleanup_task, CleanupConfig};
use restchat::room::repository::{InMemoryRoomRepository, RoomRepository};
use restchat::shared::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restchat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chat relay server");

    // Single in-memory store, injected into handlers through AppState
    let room_repository: Arc<dyn RoomRepository + Send + Sync> =
        Arc::new(InMemoryRoomRepository::new());
    let app_state = AppState::new(Arc::clone(&room_repository));

    // Evict rooms that have seen no messages in a day; the store itself
    // places no bound on a room's message log
    tokio::spawn(start_cleanup_task(
        Arc::clone(&room_repository),
        CleanupConfig::default(),
    ));

    let app = restchat::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
