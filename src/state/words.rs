use super::AppState;
use crate::error::{GameError, GameResult};
use crate::themes::find_theme;
use crate::types::*;
use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct WordPick {
    pub word: String,
    /// The played history was exhausted and cleared before picking
    pub reset: bool,
}

/// Pick a word from `words` that is not in `played`, and append it to `played`.
///
/// When every word was already played the history is cleared and the whole
/// list becomes available again. Returns None only if `words` is empty.
pub fn pick_word<R: Rng>(words: &[&str], played: &mut Vec<String>, rng: &mut R) -> Option<WordPick> {
    let mut available: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !played.iter().any(|p| p.as_str() == *w))
        .collect();

    let reset = available.is_empty();
    if reset {
        played.clear();
        available = words.to_vec();
    }

    let word = available.choose(rng)?.to_string();
    played.push(word.clone());
    Some(WordPick { word, reset })
}

impl AppState {
    /// Draw the next word for the room's current theme
    pub async fn generate_word(&self, room_id: &str, host_id: &str) -> GameResult<String> {
        let snapshot = self.require_host(room_id, host_id, "generate words").await?;

        if snapshot.room.status != RoomStatus::Playing {
            return Err(GameError::State("The game is not active".to_string()));
        }
        let theme_id = snapshot
            .room
            .current_theme
            .clone()
            .ok_or_else(|| GameError::State("No theme selected".to_string()))?;
        let theme = find_theme(&theme_id).ok_or(GameError::NotFound("Theme"))?;
        Self::check_transition(snapshot.phase(), GamePhase::Playing)?;

        let mut room = snapshot.room;
        let pick = {
            let mut rng = rand::rng();
            pick_word(theme.words, &mut room.played_words, &mut rng)
        }
        .ok_or_else(|| GameError::State(format!("Theme {} has no words", theme.id)))?;

        room.current_word = Some(pick.word.clone());

        let mut game_state = snapshot.game_state;
        game_state.phase = GamePhase::Playing;
        game_state.round_start_time = Some(chrono::Utc::now());

        self.save_room(room, game_state).await?;
        self.record_action(
            room_id,
            ActionType::GenerateWord,
            host_id,
            serde_json::json!({ "word": pick.word }),
        )
        .await?;

        tracing::info!(room_id, theme = theme.id, reset = pick.reset, "Word generated");
        tracing::debug!(room_id, word = %pick.word, "Generated word");
        Ok(pick.word)
    }
}
