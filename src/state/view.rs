//! Client projections of stored rooms.
//!
//! The only place that reads `Player::is_impostor` for output. The flag and
//! the current word are combined into a [`PlayerWord`] for the requesting
//! player alone; every other projection leaves both out.

use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::*;
use crate::types::*;

/// Shown to impostors in place of the word
pub const IMPOSTOR_SENTINEL: &str = "IMPOSTOR";

pub fn roster(players: &[Player]) -> Vec<RosterEntry> {
    players
        .iter()
        .map(|p| RosterEntry {
            name: p.name.clone(),
            is_host: p.is_host,
            is_connected: p.is_connected,
        })
        .collect()
}

/// Public view of a room. Excludes the current word and the word history.
pub fn room_view(snapshot: &RoomSnapshot) -> RoomView {
    let room = &snapshot.room;
    RoomView {
        id: room.id.clone(),
        name: room.name.clone(),
        status: room.status,
        phase: snapshot.phase(),
        round: room.current_round,
        max_players: room.max_players,
        player_count: snapshot.players.len(),
        current_theme: room.current_theme.clone(),
        words_played: room.played_words.len(),
        players: roster(&snapshot.players),
        version: room.version,
        created_at: room.created_at,
        updated_at: room.updated_at,
    }
}

pub fn player_session(player: &Player) -> PlayerSession {
    PlayerSession {
        id: player.id.clone(),
        room_id: player.room_id.clone(),
        name: player.name.clone(),
        is_host: player.is_host,
        session_id: player.session_id.clone(),
    }
}

/// What `player` gets to see of the current word, if one was drawn
pub fn player_word(room: &Room, player: &Player) -> Option<PlayerWord> {
    let word = room.current_word.as_ref()?;
    Some(if player.is_impostor {
        PlayerWord {
            word: IMPOSTOR_SENTINEL.to_string(),
            is_impostor: true,
        }
    } else {
        PlayerWord {
            word: word.clone(),
            is_impostor: false,
        }
    })
}

/// Private view for one player, or None if they are not in the room
pub fn player_view(snapshot: &RoomSnapshot, player_id: &str) -> Option<PlayerView> {
    let player = snapshot.player(player_id)?;
    let room = &snapshot.room;
    Some(PlayerView {
        room_id: room.id.clone(),
        room_name: room.name.clone(),
        status: room.status,
        phase: snapshot.phase(),
        round: room.current_round,
        theme: room.current_theme.clone(),
        player_word: player_word(room, player),
        is_host: player.is_host,
        players: roster(&snapshot.players),
        version: room.version,
        last_updated: room.updated_at,
    })
}

impl AppState {
    /// Load the private view of `player_id` in `room_id`
    pub async fn get_player_view(&self, room_id: &str, player_id: &str) -> GameResult<PlayerView> {
        let snapshot = self.load_room(room_id).await?;
        player_view(&snapshot, player_id).ok_or(GameError::NotFound("Player"))
    }
}
