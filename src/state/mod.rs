mod cleanup;
mod phase;
mod roles;
mod room;
pub mod view;
mod words;

pub use roles::{assign_impostors, impostor_count_for};
pub use words::{pick_word, WordPick};

use crate::config::Config;
use crate::error::{GameError, GameResult};
use crate::store::{MemoryStore, RoomStore};
use crate::types::*;
use std::sync::Arc;

/// Shared application state.
///
/// Holds no game data itself; every operation reads from and writes back to
/// the injected store, so handlers never share mutable state in-process.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn RoomStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// State backed by a fresh in-memory store and default config
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Config::default())
    }

    /// Load a room or fail with NotFound
    pub(crate) async fn load_room(&self, room_id: &str) -> GameResult<RoomSnapshot> {
        self.store
            .room(room_id)
            .await?
            .ok_or(GameError::NotFound("Room"))
    }

    /// Load a room and check that `host_id` currently holds the host flag in it.
    /// Always re-reads the store; nothing about the host is cached.
    pub(crate) async fn require_host(
        &self,
        room_id: &str,
        host_id: &str,
        action: &'static str,
    ) -> GameResult<RoomSnapshot> {
        let snapshot = self.load_room(room_id).await?;
        match snapshot.player(host_id) {
            Some(p) if p.is_host => Ok(snapshot),
            _ => {
                tracing::warn!(room_id, player_id = host_id, action, "Rejected non-host command");
                Err(GameError::Authorization(action))
            }
        }
    }

    /// Write back room and game state, mirroring the shared columns
    pub(crate) async fn save_room(&self, mut room: Room, mut game_state: GameState) -> GameResult<()> {
        room.touch();
        game_state.status = room.status;
        game_state.current_round = room.current_round;
        game_state.current_theme = room.current_theme.clone();
        game_state.current_word = room.current_word.clone();

        self.store.update_room(room).await?;
        self.store.update_game_state(game_state).await?;
        Ok(())
    }

    /// Touch a room after a change that only affected its players
    pub(crate) async fn touch_room(&self, mut room: Room) -> GameResult<()> {
        room.touch();
        self.store.update_room(room).await?;
        Ok(())
    }

    pub(crate) async fn record_action(
        &self,
        room_id: &str,
        action_type: ActionType,
        player_id: &str,
        data: serde_json::Value,
    ) -> GameResult<()> {
        self.store
            .append_action(GameAction::new(room_id, action_type, player_id, data))
            .await?;
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
