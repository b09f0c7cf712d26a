use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::{AppError, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://homeboard.db?mode=rwc";
pub const DEFAULT_SOUNDS_PATH: &str = "static/tracks";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub sounds_path: PathBuf,
    pub quotes_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let sounds_path = lookup("SOUNDS_PATH").unwrap_or_else(|| DEFAULT_SOUNDS_PATH.to_string());
        let quotes_path = lookup("QUOTES_PATH").filter(|p| !p.is_empty()).map(PathBuf::from);

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR '{bind_addr}': {e}")))?;

        Ok(Self {
            database_url,
            sounds_path: PathBuf::from(sounds_path),
            quotes_path,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.sounds_path, PathBuf::from(DEFAULT_SOUNDS_PATH));
        assert!(config.quotes_path.is_none());
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SOUNDS_PATH", "/srv/sounds"),
            ("QUOTES_PATH", "quotes.json"),
            ("BIND_ADDR", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.sounds_path, PathBuf::from("/srv/sounds"));
        assert_eq!(config.quotes_path, Some(PathBuf::from("quotes.json")));
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_bad_bind_addr() {
        let res = Config::from_lookup(lookup(&[("BIND_ADDR", "not an address")]));
        assert!(matches!(res, Err(AppError::Config(_))));
    }
}
