use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that periodically deletes orphaned, empty and
/// stale rooms and marks silent players as disconnected
pub fn spawn_cleanup_sweeper(state: Arc<AppState>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            match state.cleanup_rooms(Utc::now()).await {
                Ok(summary) if summary.total_cleaned > 0 => {
                    tracing::debug!(total = summary.total_cleaned, "Sweep removed stale state");
                }
                Ok(_) => {}
                // Try again next tick
                Err(e) => tracing::error!(error = %e, "Cleanup sweep failed"),
            }
        }
    });
}
