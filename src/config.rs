//! Host configuration from environment variables

use crate::runtime::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_IDLE_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;

/// Value of `TRIP_PLANNER_DB_PATH` that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Where committed sessions are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbLocation,
    /// Session used for input lines that don't name one
    pub default_session: String,
    pub channel_capacity: usize,
    /// How long a session runtime may sit without events before it stops
    pub idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db = match lookup("TRIP_PLANNER_DB_PATH") {
            Some(path) if path == IN_MEMORY => DbLocation::InMemory,
            Some(path) if !path.is_empty() => DbLocation::File(PathBuf::from(path)),
            _ => {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                DbLocation::File(PathBuf::from(format!("{home}/.trip-planner/sessions.db")))
            }
        };

        let default_session = lookup("TRIP_PLANNER_SESSION")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let channel_capacity = lookup("TRIP_PLANNER_CHANNEL_CAPACITY")
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);

        let idle_timeout = lookup("TRIP_PLANNER_IDLE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map_or(DEFAULT_IDLE_TIMEOUT, Duration::from_secs);

        Self {
            db,
            default_session,
            channel_capacity,
            idle_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("HOME", "/home/traveler")]);
        assert_eq!(
            config.db,
            DbLocation::File(PathBuf::from("/home/traveler/.trip-planner/sessions.db"))
        );
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.idle_timeout, DEFAULT_IDLE_TIMEOUT);
        assert!(uuid::Uuid::parse_str(&config.default_session).is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TRIP_PLANNER_DB_PATH", ":memory:"),
            ("TRIP_PLANNER_SESSION", "rome-2026"),
            ("TRIP_PLANNER_CHANNEL_CAPACITY", "8"),
            ("TRIP_PLANNER_IDLE_TIMEOUT_SECS", "90"),
        ]);
        assert_eq!(config.db, DbLocation::InMemory);
        assert_eq!(config.default_session, "rome-2026");
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("TRIP_PLANNER_DB_PATH", "/var/lib/trips.db"),
            ("TRIP_PLANNER_CHANNEL_CAPACITY", "zero"),
        ]);
        assert_eq!(config.db, DbLocation::File(PathBuf::from("/var/lib/trips.db")));
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);

        let config = config_from(&[
            ("TRIP_PLANNER_CHANNEL_CAPACITY", "0"),
            ("TRIP_PLANNER_IDLE_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.idle_timeout, DEFAULT_IDLE_TIMEOUT);
    }
}
