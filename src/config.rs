// src/config.rs
use std::{env, str::FromStr, time::Duration};

use tracing::Level;

use crate::error::{ChatError, ChatResult};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/stream";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Longest wait for the next body chunk. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    pub log_level: Level,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
            log_level: Level::WARN,
        }
    }
}

impl ChatConfig {
    /// Reads `CHAT_*` variables, loading `.env` first when present.
    pub fn from_env() -> ChatResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("CHAT_ENDPOINT") {
            let endpoint = endpoint.trim();
            if endpoint.is_empty() {
                return Err(ChatError::Config("CHAT_ENDPOINT is empty".to_string()));
            }
            config.endpoint = endpoint.to_string();
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "CHAT_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "CHAT_IDLE_TIMEOUT_SECS")? {
            config.idle_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(level) = parse_var::<Level>(&lookup, "CHAT_LOG")? {
            config.log_level = level;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> ChatResult<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ChatError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn overrides_and_zero_idle_disables_timeout() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("CHAT_ENDPOINT", "http://localhost:8080/stream"),
            ("CHAT_IDLE_TIMEOUT_SECS", "0"),
            ("CHAT_CONNECT_TIMEOUT_SECS", "3"),
            ("CHAT_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/stream");
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ChatConfig::from_lookup(lookup_from(&[("CHAT_IDLE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));

        let err = ChatConfig::from_lookup(lookup_from(&[("CHAT_ENDPOINT", "  ")])).unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }
}
