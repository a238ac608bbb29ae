//! Room Store contract.
//!
//! The store owns durability for the four tables (rooms, players,
//! game_states, game_actions). Services only talk to it through
//! [`RoomStore`], so a relational backend can replace [`MemoryStore`]
//! without touching game logic.
//!
//! Each call is atomic on its own; there is no multi-call transaction and
//! no compare-and-swap, so concurrent read-modify-write sequences are
//! last-write-wins.

mod memory;

use async_trait::async_trait;

use crate::types::*;

pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("No {table} row with id {id}")]
    MissingRow { table: &'static str, id: String },

    #[error("Duplicate {table} row with id {id}")]
    Duplicate { table: &'static str, id: String },
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a room together with its first player and initial game state
    async fn insert_room(&self, room: Room, host: Player, game_state: GameState)
        -> StoreResult<()>;

    /// Load a room joined with its players and game state
    async fn room(&self, room_id: &str) -> StoreResult<Option<RoomSnapshot>>;

    /// Load all rooms, optionally filtered by status, newest first
    async fn list_rooms(&self, status: Option<RoomStatus>) -> StoreResult<Vec<RoomSnapshot>>;

    async fn update_room(&self, room: Room) -> StoreResult<()>;

    /// Delete a room and cascade to its players, game state and actions.
    /// Returns false if the room did not exist.
    async fn delete_room(&self, room_id: &str) -> StoreResult<bool>;

    async fn insert_player(&self, player: Player) -> StoreResult<()>;

    async fn update_player(&self, player: Player) -> StoreResult<()>;

    /// Returns false if the player did not exist
    async fn delete_player(&self, room_id: &str, player_id: &str) -> StoreResult<bool>;

    async fn update_game_state(&self, game_state: GameState) -> StoreResult<()>;

    async fn append_action(&self, action: GameAction) -> StoreResult<()>;

    /// Action log of a room in insertion order
    async fn actions(&self, room_id: &str) -> StoreResult<Vec<GameAction>>;
}
