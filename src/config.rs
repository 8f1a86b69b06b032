use std::env;
use std::net::SocketAddr;

use chrono::Duration;

use crate::db::repository::DEFAULT_STORAGE_KEY;
use crate::error::ConfigError;
use crate::services::validation::DEFAULT_PAST_GRACE_SECS;

const DEFAULT_DATABASE_URL: &str = "sqlite://agenda.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub storage_key: String,
    pub past_grace: Duration,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source; unset variables
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = lookup("AGENDA_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidValue {
            key: "AGENDA_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let storage_key = lookup("AGENDA_STORAGE_KEY")
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let past_grace = match lookup("AGENDA_PAST_GRACE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs >= 0)
                .and_then(Duration::try_seconds)
                .ok_or(ConfigError::InvalidValue {
                    key: "AGENDA_PAST_GRACE_SECS",
                    value: raw,
                })?,
            None => Duration::seconds(DEFAULT_PAST_GRACE_SECS),
        };

        Ok(Self {
            database_url,
            bind_addr,
            storage_key,
            past_grace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("defaults should parse");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.past_grace, Duration::seconds(60));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("AGENDA_BIND_ADDR", "0.0.0.0:8080"),
            ("AGENDA_STORAGE_KEY", "@test:agenda"),
            ("AGENDA_PAST_GRACE_SECS", "0"),
        ]))
        .expect("overrides should parse");

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.storage_key, "@test:agenda");
        assert_eq!(config.past_grace, Duration::zero());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_addr = AppConfig::from_lookup(lookup_from(&[("AGENDA_BIND_ADDR", "nowhere")]));
        assert!(matches!(
            bad_addr,
            Err(ConfigError::InvalidValue { key: "AGENDA_BIND_ADDR", .. })
        ));

        let bad_grace = AppConfig::from_lookup(lookup_from(&[("AGENDA_PAST_GRACE_SECS", "-5")]));
        assert!(matches!(
            bad_grace,
            Err(ConfigError::InvalidValue { key: "AGENDA_PAST_GRACE_SECS", .. })
        ));
        let huge_grace = AppConfig::from_lookup(lookup_from(&[(
            "AGENDA_PAST_GRACE_SECS",
            "9223372036854775807",
        )]));
        assert!(matches!(
            huge_grace,
            Err(ConfigError::InvalidValue { key: "AGENDA_PAST_GRACE_SECS", .. })
        ));
    }
}
