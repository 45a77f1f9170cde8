//! Configuration management for likedeck.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. They are read once at start-up into a [`Config`] which is then shared
//! by the service client and the web server.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file (working directory, or the path given with `--env-file`)
//! 3. Application defaults (where applicable)

use std::{env, path::Path};

use crate::error::ConfigError;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REVOKE_URL: &str = "https://accounts.spotify.com/api/token/revoke";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-library-read user-library-modify playlist-read-private \
playlist-modify-public playlist-modify-private user-follow-read user-follow-modify \
user-top-read user-read-recently-played";

/// Minimum length of `SESSION_SECRET`, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 16;

/// Loads environment variables from a `.env` file.
///
/// With an explicit path the file must exist. Without one, a `.env` in the
/// working directory is used when present and silently skipped otherwise, so
/// plain environment variables keep working on their own.
///
/// # Example
///
/// ```
/// use likedeck::config;
///
/// if let Err(e) = config::load_env(None) {
///     eprintln!("Configuration error: {}", e);
/// }
/// ```
pub fn load_env(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) => dotenv::from_path(path)
            .map(|_| ())
            .map_err(|e| ConfigError::EnvFile(format!("{}: {}", path.display(), e))),
        None => match dotenv::dotenv() {
            Ok(_) => Ok(()),
            Err(dotenv::Error::Io(_)) => Ok(()),
            Err(e) => Err(ConfigError::EnvFile(e.to_string())),
        },
    }
}

/// Runtime settings of the application.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub revoke_url: String,
    pub api_url: String,
    pub session_secret: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "SESSION_SECRET",
                reason: format!("must be at least {} bytes long", MIN_SESSION_SECRET_LEN),
            });
        }

        let config = Config {
            server_address: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            revoke_url: or_default("SPOTIFY_API_REVOKE_URL", DEFAULT_REVOKE_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            session_secret,
        };

        reqwest::Url::parse(&config.redirect_uri).map_err(|e| ConfigError::Invalid {
            key: "SPOTIFY_API_REDIRECT_URI",
            reason: e.to_string(),
        })?;
        reqwest::Url::parse(&config.auth_url).map_err(|e| ConfigError::Invalid {
            key: "SPOTIFY_API_AUTH_URL",
            reason: e.to_string(),
        })?;

        Ok(config)
    }
}
