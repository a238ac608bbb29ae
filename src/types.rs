use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type SessionId = String;
pub type ActionId = String;
pub type ThemeId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    ThemeSelection,
    WordGeneration,
    Playing,
    // Defined for clients, never entered by the server
    Discussion,
    Voting,
    RoundEnd,
    GameEnd,
}

impl GamePhase {
    /// Phases a started, unfinished game can be in
    pub fn is_in_game(&self) -> bool {
        !matches!(self, GamePhase::Waiting | GamePhase::GameEnd)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    StartGame,
    ChangeTheme,
    GenerateWord,
    NextRound,
    EndRound,
    EndGame,
}

/// A row of the `rooms` table.
///
/// Not `Serialize`. Clients only ever see the projections in
/// `crate::protocol`, built by the view module.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub host_id: PlayerId,
    pub status: RoomStatus,
    pub max_players: usize,
    pub current_round: u32,
    pub current_theme: Option<ThemeId>,
    pub current_word: Option<String>,
    /// Words already drawn from `current_theme`, reset on theme change or exhaustion
    pub played_words: Vec<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Bump version and update timestamp after a mutation
    pub fn touch(&mut self) {
        self.bump_version();
        self.updated_at = Utc::now();
    }

    /// Bump version only, for changes that are not room activity
    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// A row of the `players` table
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub room_id: RoomId,
    pub name: String,
    pub is_host: bool,
    /// Secret. Only the view module may read this for client output.
    pub is_impostor: bool,
    pub session_id: SessionId,
    pub is_connected: bool,
    pub last_seen: DateTime<Utc>,
}

impl Player {
    pub fn new(room_id: &str, name: String, is_host: bool) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            room_id: room_id.to_string(),
            name,
            is_host,
            is_impostor: false,
            session_id: ulid::Ulid::new().to_string(),
            is_connected: true,
            last_seen: Utc::now(),
        }
    }

    /// Refresh session and liveness on reconnect
    pub fn refresh_session(&mut self) {
        self.session_id = ulid::Ulid::new().to_string();
        self.is_connected = true;
        self.last_seen = Utc::now();
    }
}

/// A row of the `game_states` table, one per room
#[derive(Debug, Clone)]
pub struct GameState {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub phase: GamePhase,
    pub current_round: u32,
    pub current_theme: Option<ThemeId>,
    pub current_word: Option<String>,
    pub impostor_count: usize,
    pub round_start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl GameState {
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            status: RoomStatus::Waiting,
            phase: GamePhase::Waiting,
            current_round: 0,
            current_theme: None,
            current_word: None,
            impostor_count: 0,
            round_start_time: None,
            created_at: Utc::now(),
        }
    }
}

/// An entry of the append-only `game_actions` log
#[derive(Debug, Clone)]
pub struct GameAction {
    pub id: ActionId,
    pub room_id: RoomId,
    pub action_type: ActionType,
    pub player_id: PlayerId,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl GameAction {
    pub fn new(
        room_id: &str,
        action_type: ActionType,
        player_id: &str,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            room_id: room_id.to_string(),
            action_type,
            player_id: player_id.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }
}

/// A room joined with its players and game state, as read from the store
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room: Room,
    /// Ordered by join time
    pub players: Vec<Player>,
    pub game_state: GameState,
}

impl RoomSnapshot {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn phase(&self) -> GamePhase {
        self.game_state.phase
    }
}
