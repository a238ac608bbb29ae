use super::AppState;
use crate::error::{GameError, GameResult};
use crate::themes::find_theme;
use crate::types::*;

impl AppState {
    /// Check if a phase transition is valid
    fn is_valid_phase_transition(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;

        match (from, to) {
            // Start game
            (Waiting, ThemeSelection) => true,
            // Change theme
            (ThemeSelection | WordGeneration | Playing | RoundEnd, ThemeSelection) => true,
            // Generate word (re-rolling while playing is allowed)
            (ThemeSelection | WordGeneration | Playing, Playing) => true,
            // Next round
            (ThemeSelection | WordGeneration | Playing | RoundEnd, WordGeneration) => true,
            (Playing, RoundEnd) => true,
            // Any started game can be ended
            (from, GameEnd) => from.is_in_game(),

            // All other transitions are invalid
            _ => false,
        }
    }

    pub(crate) fn check_transition(from: GamePhase, to: GamePhase) -> GameResult<()> {
        if Self::is_valid_phase_transition(from, to) {
            Ok(())
        } else {
            Err(GameError::State(format!(
                "Invalid phase transition from {:?} to {:?}",
                from, to
            )))
        }
    }

    /// Load the room for a host command that needs a running game
    async fn require_active_game(
        &self,
        room_id: &str,
        host_id: &str,
        action: &'static str,
    ) -> GameResult<RoomSnapshot> {
        let snapshot = self.require_host(room_id, host_id, action).await?;
        if snapshot.room.status != RoomStatus::Playing {
            return Err(GameError::State("The game is not active".to_string()));
        }
        Ok(snapshot)
    }

    /// Start the game: assign impostors and enter theme selection for round 1
    pub async fn start_game(&self, room_id: &str, host_id: &str, theme_id: &str) -> GameResult<()> {
        let snapshot = self.require_host(room_id, host_id, "start the game").await?;
        let theme = find_theme(theme_id).ok_or(GameError::NotFound("Theme"))?;

        if snapshot.room.status != RoomStatus::Waiting {
            return Err(GameError::State("The game has already started".to_string()));
        }
        Self::check_transition(snapshot.phase(), GamePhase::ThemeSelection)?;

        let mut game_state = snapshot.game_state.clone();
        let players = Self::assign_roles(&snapshot, &mut game_state);

        let mut room = snapshot.room;
        room.status = RoomStatus::Playing;
        room.current_theme = Some(theme.id.to_string());
        room.current_round = 1;
        room.current_word = None;
        room.played_words.clear();

        game_state.phase = GamePhase::ThemeSelection;
        game_state.round_start_time = Some(chrono::Utc::now());

        // Roles are only written once the room is marked as playing
        self.save_room(room, game_state).await?;
        for player in players {
            self.store.update_player(player).await?;
        }
        self.record_action(
            room_id,
            ActionType::StartGame,
            host_id,
            serde_json::json!({ "themeId": theme.id }),
        )
        .await?;

        tracing::info!(room_id, theme = theme.id, "Game started");
        Ok(())
    }

    /// Switch theme, clearing the word history. Impostors are kept.
    pub async fn change_theme(&self, room_id: &str, host_id: &str, theme_id: &str) -> GameResult<()> {
        let snapshot = self
            .require_active_game(room_id, host_id, "change the theme")
            .await?;
        let theme = find_theme(theme_id).ok_or(GameError::NotFound("Theme"))?;
        Self::check_transition(snapshot.phase(), GamePhase::ThemeSelection)?;

        let mut room = snapshot.room;
        room.current_theme = Some(theme.id.to_string());
        room.played_words.clear();
        room.current_word = None;

        let mut game_state = snapshot.game_state;
        game_state.phase = GamePhase::ThemeSelection;

        self.save_room(room, game_state).await?;
        self.record_action(
            room_id,
            ActionType::ChangeTheme,
            host_id,
            serde_json::json!({ "newThemeId": theme.id }),
        )
        .await?;

        tracing::info!(room_id, theme = theme.id, "Theme changed");
        Ok(())
    }

    /// Advance to the next round. Impostors are assigned per game, not per round.
    pub async fn next_round(&self, room_id: &str, host_id: &str) -> GameResult<u32> {
        let snapshot = self
            .require_active_game(room_id, host_id, "start the next round")
            .await?;
        Self::check_transition(snapshot.phase(), GamePhase::WordGeneration)?;

        let mut room = snapshot.room;
        room.current_round += 1;
        room.current_word = None;
        let round = room.current_round;

        let mut game_state = snapshot.game_state;
        game_state.phase = GamePhase::WordGeneration;

        self.save_room(room, game_state).await?;
        self.record_action(
            room_id,
            ActionType::NextRound,
            host_id,
            serde_json::json!({ "round": round }),
        )
        .await?;

        tracing::info!(room_id, round, "Next round");
        Ok(round)
    }

    /// Close the current round; the word stays visible until the next one
    pub async fn end_round(&self, room_id: &str, host_id: &str) -> GameResult<()> {
        let snapshot = self
            .require_active_game(room_id, host_id, "end the round")
            .await?;
        Self::check_transition(snapshot.phase(), GamePhase::RoundEnd)?;

        let round = snapshot.room.current_round;
        let mut game_state = snapshot.game_state;
        game_state.phase = GamePhase::RoundEnd;

        self.save_room(snapshot.room, game_state).await?;
        self.record_action(
            room_id,
            ActionType::EndRound,
            host_id,
            serde_json::json!({ "round": round }),
        )
        .await?;

        tracing::info!(room_id, round, "Round ended");
        Ok(())
    }

    /// Finish the game
    pub async fn end_game(&self, room_id: &str, host_id: &str) -> GameResult<()> {
        let snapshot = self
            .require_active_game(room_id, host_id, "end the game")
            .await?;
        Self::check_transition(snapshot.phase(), GamePhase::GameEnd)?;

        let rounds = snapshot.room.current_round;
        let mut room = snapshot.room;
        room.status = RoomStatus::Finished;
        room.current_word = None;

        let mut game_state = snapshot.game_state;
        game_state.phase = GamePhase::GameEnd;

        self.save_room(room, game_state).await?;
        self.record_action(
            room_id,
            ActionType::EndGame,
            host_id,
            serde_json::json!({ "rounds": rounds }),
        )
        .await?;

        tracing::info!(room_id, rounds, "Game ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{MemoryStore, RoomStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Memory store whose room writes fail
    struct ReadOnlyRooms(MemoryStore);

    #[async_trait]
    impl RoomStore for ReadOnlyRooms {
        async fn insert_room(&self, room: Room, host: Player, gs: GameState) -> StoreResult<()> {
            self.0.insert_room(room, host, gs).await
        }
        async fn room(&self, room_id: &str) -> StoreResult<Option<RoomSnapshot>> {
            self.0.room(room_id).await
        }
        async fn list_rooms(&self, status: Option<RoomStatus>) -> StoreResult<Vec<RoomSnapshot>> {
            self.0.list_rooms(status).await
        }
        async fn update_room(&self, _: Room) -> StoreResult<()> {
            Err(StoreError::Unavailable("rooms table locked".to_string()))
        }
        async fn delete_room(&self, room_id: &str) -> StoreResult<bool> {
            self.0.delete_room(room_id).await
        }
        async fn insert_player(&self, player: Player) -> StoreResult<()> {
            self.0.insert_player(player).await
        }
        async fn update_player(&self, player: Player) -> StoreResult<()> {
            self.0.update_player(player).await
        }
        async fn delete_player(&self, room_id: &str, player_id: &str) -> StoreResult<bool> {
            self.0.delete_player(room_id, player_id).await
        }
        async fn update_game_state(&self, gs: GameState) -> StoreResult<()> {
            self.0.update_game_state(gs).await
        }
        async fn append_action(&self, action: GameAction) -> StoreResult<()> {
            self.0.append_action(action).await
        }
        async fn actions(&self, room_id: &str) -> StoreResult<Vec<GameAction>> {
            self.0.actions(room_id).await
        }
    }

    /// Room with Ana (host), Beto and Carla
    async fn lobby(state: &AppState) -> (String, Player, Player) {
        let (snapshot, host) = state.create_room("Ana").await.unwrap();
        let room_id = snapshot.room.id;
        let beto = state.join_room(&room_id, "Beto").await.unwrap();
        state.join_room(&room_id, "Carla").await.unwrap();
        (room_id, host, beto)
    }

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        assert!(AppState::is_valid_phase_transition(Waiting, ThemeSelection));
        assert!(AppState::is_valid_phase_transition(RoundEnd, WordGeneration));
        assert!(AppState::is_valid_phase_transition(Playing, Playing));
        assert!(AppState::is_valid_phase_transition(RoundEnd, GameEnd));

        assert!(!AppState::is_valid_phase_transition(Waiting, Playing));
        assert!(!AppState::is_valid_phase_transition(Waiting, GameEnd));
        assert!(!AppState::is_valid_phase_transition(RoundEnd, Playing));
        assert!(!AppState::is_valid_phase_transition(GameEnd, ThemeSelection));
        assert!(!AppState::is_valid_phase_transition(ThemeSelection, RoundEnd));
        assert!(!AppState::is_valid_phase_transition(Playing, Discussion));
        assert!(!AppState::is_valid_phase_transition(Playing, Voting));
    }

    #[tokio::test]
    async fn test_start_game() {
        let state = AppState::in_memory();
        let (room_id, host, _) = lobby(&state).await;

        state.start_game(&room_id, &host.id, "animals").await.unwrap();

        let room = state.get_room(&room_id).await.unwrap();
        assert_eq!(room.room.status, RoomStatus::Playing);
        assert_eq!(room.room.current_round, 1);
        assert_eq!(room.room.current_theme.as_deref(), Some("animals"));
        assert_eq!(room.phase(), GamePhase::ThemeSelection);
        assert_eq!(room.game_state.impostor_count, 1);
        assert_eq!(room.players.iter().filter(|p| p.is_impostor).count(), 1);

        let actions = state.store.actions(&room_id).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::StartGame);
        assert_eq!(actions[0].player_id, host.id);
        assert_eq!(actions[0].data["themeId"], "animals");
    }

    #[tokio::test]
    async fn test_start_game_rejections() {
        let state = AppState::in_memory();
        let (room_id, host, beto) = lobby(&state).await;

        assert!(matches!(
            state.start_game(&room_id, &beto.id, "animals").await,
            Err(GameError::Authorization(_))
        ));
        assert!(matches!(
            state.start_game(&room_id, &host.id, "dinosaurs").await,
            Err(GameError::NotFound("Theme"))
        ));
        assert!(matches!(
            state.start_game("NOROOM", &host.id, "animals").await,
            Err(GameError::NotFound("Room"))
        ));

        let room = state.get_room(&room_id).await.unwrap();
        assert_eq!(room.room.status, RoomStatus::Waiting);
        assert!(state.store.actions(&room_id).await.unwrap().is_empty());

        state.start_game(&room_id, &host.id, "animals").await.unwrap();
        assert!(matches!(
            state.start_game(&room_id, &host.id, "food").await,
            Err(GameError::State(_))
        ));
    }

    #[tokio::test]
    async fn test_start_game_alone() {
        let state = AppState::in_memory();
        let (snapshot, host) = state.create_room("Ana").await.unwrap();
        state
            .start_game(&snapshot.room.id, &host.id, "colors")
            .await
            .unwrap();

        let room = state.get_room(&snapshot.room.id).await.unwrap();
        assert_eq!(room.game_state.impostor_count, 0);
        assert!(!room.players[0].is_impostor);
    }

    #[tokio::test]
    async fn test_change_theme_resets_words() {
        let state = AppState::in_memory();
        let (room_id, host, _) = lobby(&state).await;
        state.start_game(&room_id, &host.id, "animals").await.unwrap();
        state.generate_word(&room_id, &host.id).await.unwrap();
        state.generate_word(&room_id, &host.id).await.unwrap();

        let before = state.get_room(&room_id).await.unwrap();
        let impostors_before: Vec<_> = before
            .players
            .iter()
            .map(|p| (p.id.clone(), p.is_impostor))
            .collect();

        state.change_theme(&room_id, &host.id, "food").await.unwrap();

        let room = state.get_room(&room_id).await.unwrap();
        assert!(room.room.played_words.is_empty());
        assert!(room.room.current_word.is_none());
        assert!(room.game_state.current_word.is_none());
        assert_eq!(room.room.current_theme.as_deref(), Some("food"));
        assert_eq!(room.phase(), GamePhase::ThemeSelection);

        let impostors_after: Vec<_> = room
            .players
            .iter()
            .map(|p| (p.id.clone(), p.is_impostor))
            .collect();
        assert_eq!(impostors_before, impostors_after);
    }

    #[tokio::test]
    async fn test_change_theme_rejections() {
        let state = AppState::in_memory();
        let (room_id, host, beto) = lobby(&state).await;

        // Not started yet
        assert!(matches!(
            state.change_theme(&room_id, &host.id, "food").await,
            Err(GameError::State(_))
        ));

        state.start_game(&room_id, &host.id, "animals").await.unwrap();
        assert!(matches!(
            state.change_theme(&room_id, &beto.id, "food").await,
            Err(GameError::Authorization(_))
        ));
        assert!(matches!(
            state.change_theme(&room_id, &host.id, "nope").await,
            Err(GameError::NotFound("Theme"))
        ));
    }

    #[tokio::test]
    async fn test_next_round() {
        let state = AppState::in_memory();
        let (room_id, host, _) = lobby(&state).await;
        state.start_game(&room_id, &host.id, "sports").await.unwrap();
        state.generate_word(&room_id, &host.id).await.unwrap();

        let impostors_before: Vec<bool> = state
            .get_room(&room_id)
            .await
            .unwrap()
            .players
            .iter()
            .map(|p| p.is_impostor)
            .collect();

        let round = state.next_round(&room_id, &host.id).await.unwrap();
        assert_eq!(round, 2);

        let room = state.get_room(&room_id).await.unwrap();
        assert_eq!(room.room.current_round, 2);
        assert_eq!(room.game_state.current_round, 2);
        assert!(room.room.current_word.is_none());
        assert_eq!(room.phase(), GamePhase::WordGeneration);
        // Word history is kept across rounds of the same theme
        assert_eq!(room.room.played_words.len(), 1);

        let impostors_after: Vec<bool> = room.players.iter().map(|p| p.is_impostor).collect();
        assert_eq!(impostors_before, impostors_after);
    }

    #[tokio::test]
    async fn test_next_round_requires_playing() {
        let state = AppState::in_memory();
        let (room_id, host, beto) = lobby(&state).await;

        assert!(matches!(
            state.next_round(&room_id, &host.id).await,
            Err(GameError::State(_))
        ));

        state.start_game(&room_id, &host.id, "jobs").await.unwrap();
        assert!(matches!(
            state.next_round(&room_id, &beto.id).await,
            Err(GameError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_round_and_game_end() {
        let state = AppState::in_memory();
        let (room_id, host, _) = lobby(&state).await;
        state.start_game(&room_id, &host.id, "countries").await.unwrap();

        // Can't end a round before a word was drawn
        assert!(matches!(
            state.end_round(&room_id, &host.id).await,
            Err(GameError::State(_))
        ));

        state.generate_word(&room_id, &host.id).await.unwrap();
        state.end_round(&room_id, &host.id).await.unwrap();
        let room = state.get_room(&room_id).await.unwrap();
        assert_eq!(room.phase(), GamePhase::RoundEnd);
        assert!(room.room.current_word.is_some());

        // Drawing again needs a new round first
        assert!(matches!(
            state.generate_word(&room_id, &host.id).await,
            Err(GameError::State(_))
        ));

        state.end_game(&room_id, &host.id).await.unwrap();
        let room = state.get_room(&room_id).await.unwrap();
        assert_eq!(room.room.status, RoomStatus::Finished);
        assert_eq!(room.phase(), GamePhase::GameEnd);
        assert!(room.room.current_word.is_none());

        assert!(matches!(
            state.next_round(&room_id, &host.id).await,
            Err(GameError::State(_))
        ));

        let types: Vec<_> = state
            .store
            .actions(&room_id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action_type)
            .collect();
        assert_eq!(
            types,
            vec![
                ActionType::StartGame,
                ActionType::GenerateWord,
                ActionType::EndRound,
                ActionType::EndGame
            ]
        );
    }

    #[tokio::test]
    async fn test_host_checked_against_current_state() {
        let state = AppState::in_memory();
        let (room_id, host, beto) = lobby(&state).await;
        state.start_game(&room_id, &host.id, "animals").await.unwrap();

        // Demote the host directly in the store; the next command must notice
        let mut demoted = state
            .get_room(&room_id)
            .await
            .unwrap()
            .player(&host.id)
            .cloned()
            .unwrap();
        demoted.is_host = false;
        state.store.update_player(demoted).await.unwrap();

        assert!(matches!(
            state.next_round(&room_id, &host.id).await,
            Err(GameError::Authorization(_))
        ));
        assert!(matches!(
            state.next_round(&room_id, &beto.id).await,
            Err(GameError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_start_leaves_no_roles() {
        let memory = MemoryStore::new();
        let setup = AppState::new(Arc::new(memory.clone()), Config::default());
        let (room_id, host, _) = lobby(&setup).await;

        let broken = AppState::new(Arc::new(ReadOnlyRooms(memory.clone())), Config::default());
        assert!(matches!(
            broken.start_game(&room_id, &host.id, "animals").await,
            Err(GameError::Store(StoreError::Unavailable(_)))
        ));

        let room = memory.room(&room_id).await.unwrap().unwrap();
        assert_eq!(room.room.status, RoomStatus::Waiting);
        assert!(room.players.iter().all(|p| !p.is_impostor));
        assert!(memory.actions(&room_id).await.unwrap().is_empty());
    }
}
