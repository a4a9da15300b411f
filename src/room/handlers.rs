use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::RoomService,
    types::{
        CreateRoomResponse, GetMessagesQuery, JoinRoomRequest, JoinRoomResponse, MessagesResponse,
        SendMessageRequest, SendMessageResponse,
    },
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /create_room
/// Returns the generated room id
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let response = service.create_room().await?;

    info!(room_id = %response.room_id, "Room created successfully");

    Ok(Json(response))
}

/// HTTP handler for joining an existing room
///
/// POST /join_room
/// Pure existence check; no membership is tracked. A missing or malformed
/// body behaves like a missing room id.
#[instrument(name = "join_room", skip(state, request))]
pub async fn join_room(
    State(state): State<AppState>,
    request: Option<Json<JoinRoomRequest>>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let room_id = request.and_then(|Json(r)| r.room_id);

    let service = RoomService::new(Arc::clone(&state.room_repository));
    let response = service.join_room(room_id).await?;

    info!(room_id = %response.room_id, "Join validated");

    Ok(Json(response))
}

/// HTTP handler for posting a message to a room
///
/// POST /send_message
#[instrument(name = "send_message", skip(state, request))]
pub async fn send_message(
    State(state): State<AppState>,
    request: Option<Json<SendMessageRequest>>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let (room_id, author, text) = match request {
        Some(Json(r)) => (r.room_id, r.author, r.text),
        None => (None, None, None),
    };

    let service = RoomService::new(Arc::clone(&state.room_repository));
    let response = service.send_message(room_id, author, text).await?;

    Ok(Json(response))
}

/// HTTP handler for polling messages since an offset
///
/// GET /get_messages?room_id=...&after=...
#[instrument(name = "get_messages", skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<GetMessagesQuery>,
) -> Result<Json<MessagesResponse>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let response = service.get_messages(query.room_id, query.after).await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::repository::InMemoryRoomRepository;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let app_state = AppStateBuilder::new()
            .with_room_repository(room_repository)
            .build();

        Router::new()
            .route("/create_room", post(create_room))
            .route("/join_room", post(join_room))
            .route("/send_message", post(send_message))
            .route("/get_messages", get(get_messages))
            .with_state(app_state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create_test_room(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json("/create_room", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        json["room_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_room_handler() {
        let app = app();

        let response = app.oneshot(post_json("/create_room", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let room_id = json["room_id"].as_str().unwrap();
        assert!(!room_id.is_empty());
    }

    #[tokio::test]
    async fn test_join_room_handler() {
        let app = app();
        let room_id = create_test_room(&app).await;

        let body = format!(r#"{{"room_id": "{}"}}"#, room_id);
        let response = app.oneshot(post_json("/join_room", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["room_id"], room_id);
    }

    #[tokio::test]
    async fn test_join_unknown_room_returns_not_found() {
        let app = app();

        let response = app
            .oneshot(post_json("/join_room", r#"{"room_id": "nosuch"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Room not found");
    }

    #[tokio::test]
    async fn test_join_without_room_id_returns_not_found() {
        let app = app();

        // Field missing entirely
        let response = app
            .clone()
            .oneshot(post_json("/join_room", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Body missing entirely
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/join_room")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_join_with_default_state_has_no_rooms() {
        // Dummy repository: every lookup misses
        let app_state = AppStateBuilder::new().build();
        let app = Router::new()
            .route("/join_room", post(join_room))
            .with_state(app_state);

        let response = app
            .oneshot(post_json("/join_room", r#"{"room_id": "any"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_send_message_handler() {
        let app = app();
        let room_id = create_test_room(&app).await;

        let body = format!(
            r#"{{"room_id": "{}", "author": "alice", "text": "hello"}}"#,
            room_id
        );
        let response = app
            .clone()
            .oneshot(post_json("/send_message", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn test_send_message_unknown_room() {
        let app = app();

        let response = app
            .oneshot(post_json(
                "/send_message",
                r#"{"room_id": "nosuch", "author": "alice", "text": "hello"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_send_message_empty_text_is_bad_request() {
        let app = app();
        let room_id = create_test_room(&app).await;

        for text_field in [r#""text": """#, r#""text": "   ""#, ""] {
            let body = if text_field.is_empty() {
                format!(r#"{{"room_id": "{}", "author": "bob"}}"#, room_id)
            } else {
                format!(r#"{{"room_id": "{}", "author": "bob", {}}}"#, room_id, text_field)
            };

            let response = app
                .clone()
                .oneshot(post_json("/send_message", &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let json = body_json(response).await;
            assert_eq!(json["error"], "Empty message");
        }
    }

    #[tokio::test]
    async fn test_get_messages_handler() {
        let app = app();
        let room_id = create_test_room(&app).await;

        let body = format!(r#"{{"room_id": "{}", "text": "no author here"}}"#, room_id);
        app.clone()
            .oneshot(post_json("/send_message", &body))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(&format!("/get_messages?room_id={}", room_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["next_index"], 1);
        assert_eq!(json["messages"][0]["author"], "anon");
        assert_eq!(json["messages"][0]["text"], "no author here");
    }

    #[tokio::test]
    async fn test_get_messages_unknown_room() {
        let app = app();

        let response = app
            .oneshot(get_req("/get_messages?room_id=nosuch&after=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_messages_garbage_offset_polls_from_start() {
        let app = app();
        let room_id = create_test_room(&app).await;

        let body = format!(r#"{{"room_id": "{}", "author": "u1", "text": "hi"}}"#, room_id);
        app.clone()
            .oneshot(post_json("/send_message", &body))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(&format!(
                "/get_messages?room_id={}&after=not-a-number",
                room_id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["next_index"], 1);
    }

    #[tokio::test]
    async fn test_get_messages_offset_past_end() {
        let app = app();
        let room_id = create_test_room(&app).await;

        let response = app
            .oneshot(get_req(&format!(
                "/get_messages?room_id={}&after=9999",
                room_id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["messages"].as_array().unwrap().is_empty());
        assert_eq!(json["next_index"], 0);
    }
}
