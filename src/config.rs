//! Runtime settings read from the environment (after `.env` is loaded).

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_DB_PATH: &str = "recipe-finder.sqlite";
pub const DEFAULT_FAVORITES_KEY: &str = "recipeFavorites";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub db_path: String,
    pub favorites_key: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_sessions: usize,
}

impl Config {
    /// Optional:
    /// - `RECIPE_API_BASE_URL`: recipe API root, trailing `/` stripped
    /// - `RECIPE_DB_PATH`: SQLite file holding favorites
    /// - `RECIPE_FAVORITES_KEY`: store key prefix for favorites
    /// - `RECIPE_REQUEST_TIMEOUT_SECS`: default 15
    /// - `RECIPE_CONNECT_TIMEOUT_SECS`: default 5
    /// - `RECIPE_MAX_SESSIONS`: chats kept in memory, default 1000
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = env::var("RECIPE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let db_path = env::var("RECIPE_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let favorites_key = env::var("RECIPE_FAVORITES_KEY")
            .unwrap_or_else(|_| DEFAULT_FAVORITES_KEY.to_string());
        if favorites_key.trim().is_empty() {
            return Err(ConfigError::Empty {
                key: "RECIPE_FAVORITES_KEY",
            });
        }

        Ok(Config {
            api_base_url,
            db_path,
            favorites_key,
            request_timeout_secs: env_parse("RECIPE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("RECIPE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            max_sessions: env_parse("RECIPE_MAX_SESSIONS", DEFAULT_MAX_SESSIONS),
        })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid {} value {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 6] = [
        "RECIPE_API_BASE_URL",
        "RECIPE_DB_PATH",
        "RECIPE_FAVORITES_KEY",
        "RECIPE_REQUEST_TIMEOUT_SECS",
        "RECIPE_CONNECT_TIMEOUT_SECS",
        "RECIPE_MAX_SESSIONS",
    ];

    // One test touches the shared env vars so parallel test threads don't race.
    #[test]
    fn from_env_defaults_and_overrides() {
        for key in KEYS {
            env::remove_var(key);
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.db_path, DEFAULT_DB_PATH);
        assert_eq!(cfg.favorites_key, DEFAULT_FAVORITES_KEY);
        assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(cfg.max_sessions, DEFAULT_MAX_SESSIONS);

        env::set_var("RECIPE_API_BASE_URL", "http://localhost:9000/api/");
        env::set_var("RECIPE_DB_PATH", "/tmp/favs.sqlite");
        env::set_var("RECIPE_REQUEST_TIMEOUT_SECS", "30");
        env::set_var("RECIPE_CONNECT_TIMEOUT_SECS", "soon");
        env::set_var("RECIPE_MAX_SESSIONS", "50");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:9000/api");
        assert_eq!(cfg.db_path, "/tmp/favs.sqlite");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(cfg.max_sessions, 50);

        env::set_var("RECIPE_FAVORITES_KEY", "  ");
        assert_eq!(
            Config::from_env(),
            Err(ConfigError::Empty {
                key: "RECIPE_FAVORITES_KEY"
            })
        );

        for key in KEYS {
            env::remove_var(key);
        }
    }
}
