use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::{LeaveOutcome, RoomInfo};
use crate::store::StoreError;
use crate::types::*;
use chrono::Utc;
use rand::Rng;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 8;

/// Generate a random room code
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Trim and validate a display name
    pub fn validate_name(&self, raw: &str) -> GameResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(GameError::Validation("Player name is required".to_string()));
        }
        if name.chars().count() > self.config.max_name_chars {
            return Err(GameError::Validation(format!(
                "Player name must be at most {} characters",
                self.config.max_name_chars
            )));
        }
        Ok(name.to_string())
    }

    /// Create a room whose first player is its host
    pub async fn create_room(&self, player_name: &str) -> GameResult<(RoomSnapshot, Player)> {
        let name = self.validate_name(player_name)?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let room_id = generate_room_code();
            let host = Player::new(&room_id, name.clone(), true);
            let now = Utc::now();
            let room = Room {
                id: room_id.clone(),
                name: name.clone(),
                host_id: host.id.clone(),
                status: RoomStatus::Waiting,
                max_players: self.config.max_players,
                current_round: 0,
                current_theme: None,
                current_word: None,
                played_words: Vec::new(),
                version: 1,
                created_at: now,
                updated_at: now,
            };

            match self
                .store
                .insert_room(room, host.clone(), GameState::new(&room_id))
                .await
            {
                Ok(()) => {
                    tracing::info!(room_id = %room_id, player_id = %host.id, "Room created");
                    let snapshot = self.load_room(&room_id).await?;
                    return Ok((snapshot, host));
                }
                // Code collision, try another one
                Err(StoreError::Duplicate { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(GameError::Store(StoreError::Unavailable(
            "could not allocate a unique room code".to_string(),
        )))
    }

    /// Rooms still accepting players, newest first
    pub async fn list_open_rooms(&self) -> GameResult<Vec<RoomSnapshot>> {
        Ok(self.store.list_rooms(Some(RoomStatus::Waiting)).await?)
    }

    pub async fn get_room(&self, room_id: &str) -> GameResult<RoomSnapshot> {
        self.load_room(room_id).await
    }

    /// Join a room, or refresh the session of an existing player with the same name
    pub async fn join_room(&self, room_id: &str, player_name: &str) -> GameResult<Player> {
        let name = self.validate_name(player_name)?;
        let snapshot = self.load_room(room_id).await?;

        if let Some(existing) = snapshot.players.iter().find(|p| p.name == name) {
            let mut player = existing.clone();
            player.refresh_session();
            self.store.update_player(player.clone()).await?;
            self.touch_room(snapshot.room).await?;
            tracing::info!(room_id, player_id = %player.id, "Player rejoined");
            return Ok(player);
        }

        if snapshot.players.len() >= snapshot.room.max_players {
            return Err(GameError::Capacity(snapshot.room.max_players));
        }
        if snapshot.room.status != RoomStatus::Waiting {
            return Err(GameError::State("The game has already started".to_string()));
        }

        let player = Player::new(room_id, name, false);
        self.store.insert_player(player.clone()).await?;

        self.touch_room(snapshot.room).await?;

        tracing::info!(room_id, player_id = %player.id, "Player joined");
        Ok(player)
    }

    /// Remove a player. If they were the host, the whole room goes with them.
    pub async fn remove_player(&self, room_id: &str, player_id: &str) -> GameResult<LeaveOutcome> {
        let snapshot = self.load_room(room_id).await?;
        let player = snapshot
            .player(player_id)
            .ok_or(GameError::NotFound("Player"))?;

        if player.is_host {
            tracing::info!(room_id, player_id, "Host left, deleting room");
            self.delete_room(room_id).await?;
            return Ok(LeaveOutcome::HostLeft);
        }

        self.store.delete_player(room_id, player_id).await?;
        tracing::info!(room_id, player_id, "Player left");

        // A room never outlives its last player
        let Some(remaining) = self.store.room(room_id).await? else {
            return Ok(LeaveOutcome::HostLeft);
        };
        if remaining.players.is_empty() {
            self.delete_room(room_id).await?;
            return Ok(LeaveOutcome::HostLeft);
        }

        self.touch_room(remaining.room.clone()).await?;

        Ok(LeaveOutcome::PlayerLeft {
            room_info: RoomInfo {
                room_name: remaining.room.name.clone(),
                player_count: remaining.players.len(),
                host_name: remaining.host().map(|h| h.name.clone()),
            },
        })
    }

    /// Mark a player as alive
    pub async fn heartbeat(&self, room_id: &str, player_id: &str) -> GameResult<()> {
        let snapshot = self.load_room(room_id).await?;
        let mut player = snapshot
            .player(player_id)
            .cloned()
            .ok_or(GameError::NotFound("Player"))?;

        let reconnected = !player.is_connected;
        player.is_connected = true;
        player.last_seen = Utc::now();
        self.store.update_player(player).await?;

        // Pollers only need a new version when the roster visibly changed
        if reconnected {
            self.touch_room(snapshot.room).await?;
            tracing::info!(room_id, player_id, "Player reconnected");
        }
        Ok(())
    }

    /// Delete a room and everything that belongs to it
    pub async fn delete_room(&self, room_id: &str) -> GameResult<bool> {
        let deleted = self.store.delete_room(room_id).await?;
        if deleted {
            tracing::info!(room_id, "Room deleted");
        }
        Ok(deleted)
    }
}
