use crate::fonts::FontSet;
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_SCRATCH_DIR: &str = "temp";
const DEFAULT_FONTS_DIR: &str = "fonts";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Directory rendered images are written to and served from.
    pub scratch_dir: PathBuf,
    pub fonts: FontSet,
    /// Overrides the scheme+host taken from the request when building image URLs.
    pub public_base_url: Option<String>,
    pub source_fetch_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".into()))?;

        let database_max_connections = parse_var(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidVar(
                "DATABASE_MAX_CONNECTIONS".into(),
                "must be at least 1".into(),
            ));
        }

        let scratch_dir = PathBuf::from(
            lookup("SCRATCH_DIR").unwrap_or_else(|| DEFAULT_SCRATCH_DIR.to_string()),
        );
        let fonts_dir =
            PathBuf::from(lookup("FONTS_DIR").unwrap_or_else(|| DEFAULT_FONTS_DIR.to_string()));

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let timeout_secs = parse_var(
            &lookup,
            "SOURCE_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;

        Ok(Config {
            bind_address,
            database_url,
            database_max_connections,
            scratch_dir,
            fonts: FontSet::in_dir(fonts_dir),
            public_base_url,
            source_fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidVar(key.into(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]))
            .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.scratch_dir, PathBuf::from("temp"));
        assert_eq!(config.fonts.regular, Path::new("fonts").join("poppins-regular.ttf"));
        assert_eq!(config.source_fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.database_max_connections, 5);
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "DATABASE_URL"));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDRESS", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar(ref var, _) if var == "BIND_ADDRESS"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://memes.db?mode=rwc"),
            ("SCRATCH_DIR", "/tmp/scratch"),
            ("FONTS_DIR", "assets/fonts"),
            ("PUBLIC_BASE_URL", "https://memes.example.com/"),
            ("SOURCE_FETCH_TIMEOUT_SECS", "5"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/scratch"));
        assert_eq!(
            config.fonts.bold_italic,
            Path::new("assets/fonts").join("poppins-bold-italic.ttf")
        );
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://memes.example.com")
        );
        assert_eq!(config.source_fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.database_max_connections, 2);
    }

    #[test]
    fn zero_connections_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar(..)));
    }
}
