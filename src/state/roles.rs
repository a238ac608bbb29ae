//! Impostor selection.

use super::AppState;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Map a player count and a uniform roll in [0, 100) to an impostor count.
///
/// | players | 1 | 2 | 3 | 4 | 5 |
/// |---------|---|---|---|---|---|
/// | ≤3      |100|   |   |   |   |
/// | 4–5     |70 |30 |   |   |   |
/// | 6–8     |50 |30 |20 |   |   |
/// | 9–12    |50 |25 |15 |10 |   |
/// | ≥13     |50 |20 |15 |10 | 5 |
pub fn impostor_count_for(player_count: usize, roll: f64) -> usize {
    // Cumulative thresholds per bucket
    let thresholds: &[f64] = match player_count {
        0..=3 => &[],
        4..=5 => &[70.0],
        6..=8 => &[50.0, 80.0],
        9..=12 => &[50.0, 75.0, 90.0],
        _ => &[50.0, 70.0, 85.0, 95.0],
    };

    thresholds.iter().take_while(|&&t| roll >= t).count() + 1
}

/// Draw an impostor count for `player_count` players
pub fn draw_impostor_count<R: Rng>(player_count: usize, rng: &mut R) -> usize {
    impostor_count_for(player_count, rng.random_range(0.0..100.0))
}

/// Flag a random subset of `players` as impostors and clear everyone else.
///
/// Returns the number of impostors. With fewer than two players nothing is
/// changed and 0 is returned.
pub fn assign_impostors<R: Rng>(players: &mut [Player], rng: &mut R) -> usize {
    if players.len() < 2 {
        return 0;
    }

    let impostor_count = draw_impostor_count(players.len(), rng);

    let mut order: Vec<usize> = (0..players.len()).collect();
    order.shuffle(rng);

    for p in players.iter_mut() {
        p.is_impostor = false;
    }
    for &i in order.iter().take(impostor_count) {
        players[i].is_impostor = true;
    }

    impostor_count
}

impl AppState {
    /// Draw impostors for a new game.
    ///
    /// Returns the players with fresh flags for the caller to persist once
    /// the room itself is saved, and sets `game_state.impostor_count`.
    pub(crate) fn assign_roles(snapshot: &RoomSnapshot, game_state: &mut GameState) -> Vec<Player> {
        let mut players = snapshot.players.clone();
        let impostor_count = {
            let mut rng = rand::rng();
            assign_impostors(&mut players, &mut rng)
        };
        game_state.impostor_count = impostor_count;

        if players.len() < 2 {
            tracing::warn!(
                room_id = %snapshot.room.id,
                players = players.len(),
                "Not enough players to assign impostors"
            );
        } else {
            tracing::info!(
                room_id = %snapshot.room.id,
                players = players.len(),
                impostor_count,
                "Roles assigned"
            );
        }
        players
    }
}
