use super::AppState;
use crate::error::GameResult;
use crate::protocol::{CleanupSummary, Stats};
use crate::types::*;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// True if `at` lies more than `limit` before `now`
fn older_than(now: DateTime<Utc>, at: DateTime<Utc>, limit: Duration) -> bool {
    (now - at).to_std().is_ok_and(|age| age > limit)
}

/// Most recent sign of life in a room
fn last_activity(snapshot: &RoomSnapshot) -> DateTime<Utc> {
    snapshot
        .players
        .iter()
        .map(|p| p.last_seen)
        .fold(snapshot.room.updated_at, |latest, seen| latest.max(seen))
}

impl AppState {
    /// Delete every room in which no player holds the host flag
    pub async fn cleanup_orphaned_rooms(&self) -> GameResult<usize> {
        let mut deleted = 0;
        for snapshot in self.store.list_rooms(None).await? {
            if snapshot.host().is_none() && self.delete_room(&snapshot.room.id).await? {
                deleted += 1;
            }
        }

        if deleted > 0 {
            tracing::info!(deleted, "Orphaned rooms cleaned up");
        }
        Ok(deleted)
    }

    /// Full sweep: drop empty, orphaned and stale rooms, then mark players
    /// that stopped sending heartbeats as disconnected.
    pub async fn cleanup_rooms(&self, now: DateTime<Utc>) -> GameResult<CleanupSummary> {
        let mut summary = CleanupSummary::default();

        for snapshot in self.store.list_rooms(None).await? {
            let room_id = snapshot.room.id.as_str();

            if snapshot.players.is_empty() {
                if self.delete_room(room_id).await? {
                    summary.empty_rooms += 1;
                }
                continue;
            }
            if snapshot.host().is_none() {
                if self.delete_room(room_id).await? {
                    summary.orphaned_rooms += 1;
                }
                continue;
            }
            if older_than(now, last_activity(&snapshot), self.config.room_stale_after) {
                if self.delete_room(room_id).await? {
                    summary.stale_rooms += 1;
                }
                continue;
            }

            let mut disconnected = 0;
            for player in &snapshot.players {
                let timed_out = older_than(now, player.last_seen, self.config.player_timeout);
                if player.is_connected && timed_out {
                    let mut player = player.clone();
                    player.is_connected = false;
                    tracing::debug!(room_id, player_id = %player.id, "Player timed out");
                    self.store.update_player(player).await?;
                    disconnected += 1;
                }
            }

            if disconnected > 0 {
                // A timeout is not activity, so updated_at keeps driving staleness
                let mut room = snapshot.room.clone();
                room.bump_version();
                self.store.update_room(room).await?;
                summary.disconnected_players += disconnected;
            }
        }

        summary.total_cleaned = summary.orphaned_rooms
            + summary.empty_rooms
            + summary.stale_rooms
            + summary.disconnected_players;

        if summary.total_cleaned > 0 {
            tracing::info!(
                orphaned = summary.orphaned_rooms,
                empty = summary.empty_rooms,
                stale = summary.stale_rooms,
                disconnected = summary.disconnected_players,
                "Cleanup sweep finished"
            );
        }
        Ok(summary)
    }

    pub async fn stats(&self) -> GameResult<Stats> {
        let rooms = self.store.list_rooms(None).await?;
        Ok(Stats {
            total_rooms: rooms.len(),
            active_rooms: rooms
                .iter()
                .filter(|r| r.room.status != RoomStatus::Finished)
                .count(),
            total_players: rooms.iter().map(|r| r.players.len()).sum(),
        })
    }
}
