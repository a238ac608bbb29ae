//! JSON shapes exchanged with clients.
//!
//! Everything here is client-facing. None of these types carry another
//! player's impostor flag; [`PlayerWord`] is the only place the flag appears
//! and it is only ever built for the requesting player.

use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            timestamp: Utc::now(),
        }
    }
}

// ========== Requests ==========
//
// Fields are optional so missing input is reported as a validation error
// inside the envelope instead of an extractor rejection.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerNameRequest {
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub player_id: Option<String>,
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCommandRequest {
    pub host_id: Option<String>,
    pub theme_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCommandRequest {
    pub host_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdRequest {
    pub player_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateQuery {
    pub player_id: Option<String>,
}

// ========== Projections ==========

/// Public roster entry. Player ids are credentials, so neither the id nor
/// the impostor flag is included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    pub is_host: bool,
    pub is_connected: bool,
}

/// Room as seen by anyone polling it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub name: String,
    pub status: RoomStatus,
    pub phase: GamePhase,
    pub round: u32,
    pub max_players: usize,
    pub player_count: usize,
    pub current_theme: Option<ThemeId>,
    /// How many words of the current theme cycle were drawn
    pub words_played: usize,
    pub players: Vec<RosterEntry>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The requesting player's word, or the impostor sentinel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWord {
    pub word: String,
    pub is_impostor: bool,
}

/// A player's private view of the room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub room_id: RoomId,
    pub room_name: String,
    pub status: RoomStatus,
    pub phase: GamePhase,
    pub round: u32,
    pub theme: Option<ThemeId>,
    /// Absent until a word was drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_word: Option<PlayerWord>,
    pub is_host: bool,
    pub players: Vec<RosterEntry>,
    pub version: u64,
    pub last_updated: DateTime<Utc>,
}

/// Identity handed to a player when they create or join a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    pub id: PlayerId,
    pub room_id: RoomId,
    pub name: String,
    pub is_host: bool,
    pub session_id: SessionId,
}

/// Response to create and join
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSession {
    pub room: RoomView,
    pub player: PlayerSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomList {
    pub rooms: Vec<RoomView>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_name: String,
    pub player_count: usize,
    pub host_name: Option<String>,
}

/// Result of a player leaving
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LeaveOutcome {
    PlayerLeft {
        #[serde(rename = "roomInfo")]
        room_info: RoomInfo,
    },
    /// The host left and the room was deleted
    HostLeft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub orphaned_rooms: usize,
    pub empty_rooms: usize,
    pub stale_rooms: usize,
    pub disconnected_players: usize,
    pub total_cleaned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrphanCleanup {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_rooms: usize,
    pub active_rooms: usize,
    pub total_players: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(3).with_message("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 3);
        assert_eq!(json["message"], "done");
        assert!(json.get("error").is_none());
        assert!(json.get("timestamp").is_some());

        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_leave_outcome_serialization() {
        let left = LeaveOutcome::PlayerLeft {
            room_info: RoomInfo {
                room_name: "Ana".to_string(),
                player_count: 2,
                host_name: Some("Ana".to_string()),
            },
        };
        let json = serde_json::to_value(&left).unwrap();
        assert_eq!(json["action"], "player_left");
        assert_eq!(json["roomInfo"]["playerCount"], 2);
        assert_eq!(json["roomInfo"]["hostName"], "Ana");

        let json = serde_json::to_value(LeaveOutcome::HostLeft).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "host_left" }));
    }

    #[test]
    fn test_requests_accept_camel_case() {
        let req: ThemeCommandRequest =
            serde_json::from_str(r#"{"hostId":"h1","themeId":"food"}"#).unwrap();
        assert_eq!(req.host_id.as_deref(), Some("h1"));
        assert_eq!(req.theme_id.as_deref(), Some("food"));

        let req: PlayerNameRequest = serde_json::from_str("{}").unwrap();
        assert!(req.player_name.is_none());
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(
            serde_json::to_value(GamePhase::ThemeSelection).unwrap(),
            "theme_selection"
        );
        assert_eq!(serde_json::to_value(RoomStatus::Playing).unwrap(), "playing");
    }
}
