//! HTTP API endpoints.
//!
//! Every handler answers with the [`ApiResponse`] envelope; failures go
//! through `GameError`'s `IntoResponse` so status mapping lives in one place.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{GameError, GameResult};
use crate::protocol::*;
use crate::state::view::{player_session, room_view};
use crate::state::AppState;
use crate::themes::{Theme, THEMES};

type ApiResult<T> = GameResult<Json<ApiResponse<T>>>;

/// Unwrap a JSON body, reporting malformed input as a validation error
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> GameResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| GameError::Validation(rejection.body_text()))
}

/// Require a non-blank field
fn required(value: Option<String>, field: &'static str) -> GameResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GameError::Validation(format!("{} is required", field)))
}

/// The host's own view, returned by every host command
async fn host_view(state: &AppState, room_id: &str, host_id: &str) -> ApiResult<PlayerView> {
    let view = state.get_player_view(room_id, host_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> ApiResult<RoomList> {
    let rooms: Vec<RoomView> = state
        .list_open_rooms()
        .await?
        .iter()
        .map(room_view)
        .collect();
    let total = rooms.len();
    Ok(Json(ApiResponse::ok(RoomList { rooms, total })))
}

/// POST /rooms
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlayerNameRequest>, JsonRejection>,
) -> ApiResult<RoomSession> {
    let req = body(payload)?;
    let name = required(req.player_name, "playerName")?;

    let (snapshot, host) = state.create_room(&name).await?;
    Ok(Json(
        ApiResponse::ok(RoomSession {
            room: room_view(&snapshot),
            player: player_session(&host),
        })
        .with_message("Room created"),
    ))
}

/// GET /rooms/{id}
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> ApiResult<RoomView> {
    let snapshot = state.get_room(&room_id).await?;
    Ok(Json(ApiResponse::ok(room_view(&snapshot))))
}

/// POST /rooms/{id}/join
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<PlayerNameRequest>, JsonRejection>,
) -> ApiResult<RoomSession> {
    let req = body(payload)?;
    let name = required(req.player_name, "playerName")?;

    let player = state.join_room(&room_id, &name).await?;
    let snapshot = state.get_room(&room_id).await?;
    Ok(Json(
        ApiResponse::ok(RoomSession {
            room: room_view(&snapshot),
            player: player_session(&player),
        })
        .with_message(format!("{} joined the room", player.name)),
    ))
}

/// POST /rooms/{id}/leave
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<LeaveRequest>, JsonRejection>,
) -> ApiResult<LeaveOutcome> {
    let req = body(payload)?;
    let player_id = required(req.player_id, "playerId")?;

    let outcome = state.remove_player(&room_id, &player_id).await?;
    let message = match (&outcome, req.player_name) {
        (LeaveOutcome::HostLeft, _) => "The host left. The room was deleted.".to_string(),
        (LeaveOutcome::PlayerLeft { .. }, Some(name)) => format!("{} left the room", name),
        (LeaveOutcome::PlayerLeft { .. }, None) => "Player left the room".to_string(),
    };
    Ok(Json(ApiResponse::ok(outcome).with_message(message)))
}

/// POST /rooms/{id}/start-game
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<ThemeCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;
    let theme_id = required(req.theme_id, "themeId")?;

    state.start_game(&room_id, &host_id, &theme_id).await?;
    host_view(&state, &room_id, &host_id).await
}

/// POST /rooms/{id}/change-theme
pub async fn change_theme(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<ThemeCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;
    let theme_id = required(req.theme_id, "themeId")?;

    state.change_theme(&room_id, &host_id, &theme_id).await?;
    host_view(&state, &room_id, &host_id).await
}

/// POST /rooms/{id}/generate-word
///
/// The word itself is only delivered through the host's `playerWord`, so an
/// impostor host gets the sentinel like everyone else.
pub async fn generate_word(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<HostCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;

    state.generate_word(&room_id, &host_id).await?;
    host_view(&state, &room_id, &host_id).await
}

/// POST /rooms/{id}/next-round
pub async fn next_round(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<HostCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;

    let round = state.next_round(&room_id, &host_id).await?;
    let Json(response) = host_view(&state, &room_id, &host_id).await?;
    Ok(Json(response.with_message(format!("Round {} started", round))))
}

/// POST /rooms/{id}/end-round
pub async fn end_round(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<HostCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;

    state.end_round(&room_id, &host_id).await?;
    host_view(&state, &room_id, &host_id).await
}

/// POST /rooms/{id}/end-game
pub async fn end_game(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<HostCommandRequest>, JsonRejection>,
) -> ApiResult<PlayerView> {
    let req = body(payload)?;
    let host_id = required(req.host_id, "hostId")?;

    state.end_game(&room_id, &host_id).await?;
    host_view(&state, &room_id, &host_id).await
}

/// POST /rooms/{id}/heartbeat
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    payload: Result<Json<PlayerIdRequest>, JsonRejection>,
) -> ApiResult<()> {
    let req = body(payload)?;
    let player_id = required(req.player_id, "playerId")?;

    state.heartbeat(&room_id, &player_id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// GET /rooms/{id}/player-state?playerId=...
pub async fn player_state(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    query: Result<Query<PlayerStateQuery>, QueryRejection>,
) -> ApiResult<PlayerView> {
    let Query(query) = query.map_err(|rejection| GameError::Validation(rejection.body_text()))?;
    let player_id = required(query.player_id, "playerId")?;

    let view = state.get_player_view(&room_id, &player_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /themes
pub async fn list_themes() -> Json<ApiResponse<&'static [Theme]>> {
    Json(ApiResponse::ok(THEMES))
}

/// POST /admin/cleanup-orphaned-rooms
pub async fn cleanup_orphaned_rooms(State(state): State<Arc<AppState>>) -> ApiResult<OrphanCleanup> {
    let deleted_count = state.cleanup_orphaned_rooms().await?;
    Ok(Json(
        ApiResponse::ok(OrphanCleanup { deleted_count })
            .with_message(format!("Deleted {} orphaned rooms", deleted_count)),
    ))
}

/// POST /admin/cleanup-rooms
pub async fn cleanup_rooms(State(state): State<Arc<AppState>>) -> ApiResult<CleanupSummary> {
    let summary = state.cleanup_rooms(Utc::now()).await?;
    let message = format!("Cleaned up {} items", summary.total_cleaned);
    Ok(Json(ApiResponse::ok(summary).with_message(message)))
}

/// GET /admin/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Stats> {
    Ok(Json(ApiResponse::ok(state.stats().await?)))
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room))
        .route("/rooms/{id}/join", post(join_room))
        .route("/rooms/{id}/leave", post(leave_room))
        .route("/rooms/{id}/start-game", post(start_game))
        .route("/rooms/{id}/change-theme", post(change_theme))
        .route("/rooms/{id}/generate-word", post(generate_word))
        .route("/rooms/{id}/next-round", post(next_round))
        .route("/rooms/{id}/end-round", post(end_round))
        .route("/rooms/{id}/end-game", post(end_game))
        .route("/rooms/{id}/heartbeat", post(heartbeat))
        .route("/rooms/{id}/player-state", get(player_state))
        .route("/themes", get(list_themes))
        .route("/admin/cleanup-orphaned-rooms", post(cleanup_orphaned_rooms))
        .route("/admin/cleanup-rooms", post(cleanup_rooms))
        .route("/admin/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(
            required(None, "hostId"),
            Err(GameError::Validation(msg)) if msg == "hostId is required"
        ));
        assert!(matches!(
            required(Some("   ".to_string()), "hostId"),
            Err(GameError::Validation(_))
        ));
        assert_eq!(required(Some("h1".to_string()), "hostId").unwrap(), "h1");
    }

    #[tokio::test]
    async fn test_handlers_share_state() {
        let state = Arc::new(AppState::in_memory());
        let Json(created) = create_room(
            State(state.clone()),
            Ok(Json(PlayerNameRequest {
                player_name: Some("Ana".to_string()),
            })),
        )
        .await
        .unwrap();
        let session = created.data.unwrap();
        assert!(session.player.is_host);

        let Json(listed) = list_rooms(State(state)).await.unwrap();
        let list = listed.data.unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.rooms[0].id, session.room.id);
    }
}
