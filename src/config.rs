//! Environment-driven configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Default room capacity
pub const DEFAULT_MAX_PLAYERS: usize = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Room capacity for newly created rooms
    pub max_players: usize,
    pub max_name_chars: usize,
    /// Background sweep period (None = disabled)
    pub cleanup_interval: Option<Duration>,
    /// Rooms without any activity for this long are deleted by the sweep
    pub room_stale_after: Duration,
    /// Players without a heartbeat for this long are marked disconnected
    pub player_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            max_players: DEFAULT_MAX_PLAYERS,
            max_name_chars: 32,
            cleanup_interval: Some(Duration::from_secs(300)),
            room_stale_after: Duration::from_secs(60 * 60),
            player_timeout: Duration::from_secs(60),
        }
    }
}

/// Parse an env var, falling back to `default` if unset or invalid
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Invalid config value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cleanup_secs: u64 = env_or("CLEANUP_INTERVAL_SECS", 300);
        let cleanup_interval = if cleanup_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(cleanup_secs))
        };

        let max_players = match env_or("MAX_PLAYERS", defaults.max_players) {
            0 | 1 => {
                tracing::warn!("MAX_PLAYERS must be at least 2, using default");
                defaults.max_players
            }
            n => n,
        };

        let config = Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            port: env_or("PORT", defaults.port),
            max_players,
            max_name_chars: env_or("MAX_NAME_CHARS", defaults.max_name_chars).max(1),
            cleanup_interval,
            room_stale_after: Duration::from_secs(env_or(
                "ROOM_STALE_SECS",
                defaults.room_stale_after.as_secs(),
            )),
            player_timeout: Duration::from_secs(env_or(
                "PLAYER_TIMEOUT_SECS",
                defaults.player_timeout.as_secs(),
            )),
        };

        tracing::info!(
            port = config.port,
            max_players = config.max_players,
            cleanup_interval_secs = cleanup_secs,
            room_stale_secs = config.room_stale_after.as_secs(),
            player_timeout_secs = config.player_timeout.as_secs(),
            "Config loaded"
        );

        config
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "BIND_ADDR",
        "PORT",
        "MAX_PLAYERS",
        "MAX_NAME_CHARS",
        "CLEANUP_INTERVAL_SECS",
        "ROOM_STALE_SECS",
        "PLAYER_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    fn set_env(key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_players, 15);
        assert_eq!(config.cleanup_interval, Some(Duration::from_secs(300)));
        assert_eq!(config.room_stale_after, Duration::from_secs(3600));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        set_env("PORT", "8080");
        set_env("MAX_PLAYERS", "8");
        set_env("CLEANUP_INTERVAL_SECS", "0");
        set_env("PLAYER_TIMEOUT_SECS", "15");
        set_env("BIND_ADDR", "127.0.0.1");

        let config = Config::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_players, 8);
        assert_eq!(config.cleanup_interval, None);
        assert_eq!(config.player_timeout, Duration::from_secs(15));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        set_env("PORT", "not-a-port");
        set_env("MAX_PLAYERS", "1");
        set_env("ROOM_STALE_SECS", "-5");

        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_players, DEFAULT_MAX_PLAYERS);
        assert_eq!(config.room_stale_after, Duration::from_secs(3600));
        clear_env();
    }
}
