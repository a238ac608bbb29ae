use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{RoomStore, StoreError, StoreResult};
use crate::types::*;

/// In-process store.
///
/// Lock order is rooms → players → game_states → actions. Every method
/// takes the locks it needs in that order and releases them before returning.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
    /// Players per room, in join order
    players: Arc<RwLock<HashMap<RoomId, Vec<Player>>>>,
    game_states: Arc<RwLock<HashMap<RoomId, GameState>>>,
    actions: Arc<RwLock<Vec<GameAction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(table: &'static str, id: &str) -> StoreError {
    StoreError::MissingRow {
        table,
        id: id.to_string(),
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert_room(
        &self,
        room: Room,
        host: Player,
        game_state: GameState,
    ) -> StoreResult<()> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.id) {
            return Err(StoreError::Duplicate {
                table: "rooms",
                id: room.id,
            });
        }
        let mut players = self.players.write().await;
        let mut game_states = self.game_states.write().await;

        players.insert(room.id.clone(), vec![host]);
        game_states.insert(room.id.clone(), game_state);
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn room(&self, room_id: &str) -> StoreResult<Option<RoomSnapshot>> {
        let rooms = self.rooms.read().await;
        let Some(room) = rooms.get(room_id) else {
            return Ok(None);
        };
        let players = self.players.read().await;
        let game_states = self.game_states.read().await;

        let game_state = game_states
            .get(room_id)
            .cloned()
            .ok_or_else(|| missing("game_states", room_id))?;

        Ok(Some(RoomSnapshot {
            room: room.clone(),
            players: players.get(room_id).cloned().unwrap_or_default(),
            game_state,
        }))
    }

    async fn list_rooms(&self, status: Option<RoomStatus>) -> StoreResult<Vec<RoomSnapshot>> {
        let rooms = self.rooms.read().await;
        let players = self.players.read().await;
        let game_states = self.game_states.read().await;

        let mut snapshots: Vec<RoomSnapshot> = rooms
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter_map(|room| {
                let game_state = game_states.get(&room.id)?.clone();
                Some(RoomSnapshot {
                    room: room.clone(),
                    players: players.get(&room.id).cloned().unwrap_or_default(),
                    game_state,
                })
            })
            .collect();

        snapshots.sort_by(|a, b| b.room.created_at.cmp(&a.room.created_at));
        Ok(snapshots)
    }

    async fn update_room(&self, room: Room) -> StoreResult<()> {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(&room.id) {
            Some(existing) => {
                *existing = room;
                Ok(())
            }
            None => Err(missing("rooms", &room.id)),
        }
    }

    async fn delete_room(&self, room_id: &str) -> StoreResult<bool> {
        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;
        let mut game_states = self.game_states.write().await;
        let mut actions = self.actions.write().await;

        actions.retain(|a| a.room_id != room_id);
        game_states.remove(room_id);
        players.remove(room_id);
        Ok(rooms.remove(room_id).is_some())
    }

    async fn insert_player(&self, player: Player) -> StoreResult<()> {
        let rooms = self.rooms.read().await;
        if !rooms.contains_key(&player.room_id) {
            return Err(missing("rooms", &player.room_id));
        }
        let mut players = self.players.write().await;
        let roster = players.entry(player.room_id.clone()).or_default();
        if roster.iter().any(|p| p.id == player.id) {
            return Err(StoreError::Duplicate {
                table: "players",
                id: player.id,
            });
        }
        roster.push(player);
        Ok(())
    }

    async fn update_player(&self, player: Player) -> StoreResult<()> {
        let mut players = self.players.write().await;
        let existing = players
            .get_mut(&player.room_id)
            .and_then(|roster| roster.iter_mut().find(|p| p.id == player.id))
            .ok_or_else(|| missing("players", &player.id))?;
        *existing = player;
        Ok(())
    }

    async fn delete_player(&self, room_id: &str, player_id: &str) -> StoreResult<bool> {
        let mut players = self.players.write().await;
        let Some(roster) = players.get_mut(room_id) else {
            return Ok(false);
        };
        let before = roster.len();
        roster.retain(|p| p.id != player_id);
        Ok(roster.len() < before)
    }

    async fn update_game_state(&self, game_state: GameState) -> StoreResult<()> {
        let mut game_states = self.game_states.write().await;
        match game_states.get_mut(&game_state.room_id) {
            Some(existing) => {
                *existing = game_state;
                Ok(())
            }
            None => Err(missing("game_states", &game_state.room_id)),
        }
    }

    async fn append_action(&self, action: GameAction) -> StoreResult<()> {
        let rooms = self.rooms.read().await;
        if !rooms.contains_key(&action.room_id) {
            return Err(missing("rooms", &action.room_id));
        }
        self.actions.write().await.push(action);
        Ok(())
    }

    async fn actions(&self, room_id: &str) -> StoreResult<Vec<GameAction>> {
        Ok(self
            .actions
            .read()
            .await
            .iter()
            .filter(|a| a.room_id == room_id)
            .cloned()
            .collect())
    }
}
