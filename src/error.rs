//! Error types shared by the service client and the web handlers.

use reqwest::StatusCode;
use thiserror::Error;

/// Every failure the service client can report.
///
/// Handlers never let one of these escape: they turn it into a flash message
/// (see [`ServiceError::user_message`]) and redirect to a safe page.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not authenticated with Spotify")]
    NotAuthenticated,

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Nothing to act on: {0}")]
    EmptyResult(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Spotify request failed: {0}")]
    Remote(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Maps a non-2xx response of the Web API to the matching variant.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ServiceError::NotAuthenticated,
            StatusCode::NOT_FOUND => ServiceError::NotFound("Requested resource".to_string()),
            _ => ServiceError::Remote(format!("HTTP {}: {}", status.as_u16(), excerpt(body))),
        }
    }

    /// Text shown to the user in a flash message.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::NotAuthenticated => "Please log in with Spotify first.".to_string(),
            ServiceError::Auth(_) => "Could not authorize with Spotify.".to_string(),
            ServiceError::NotFound(what) => format!("{} was not found on Spotify.", what),
            ServiceError::EmptyResult(what) => what.clone(),
            ServiceError::Validation(what) => what.clone(),
            ServiceError::Remote(_) => {
                "Spotify did not answer as expected. Please try again later.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ServiceError::Remote(format!("unexpected response shape: {}", err));
        }
        match err.status() {
            Some(status) => ServiceError::from_status(status, ""),
            None => ServiceError::Remote(err.to_string()),
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= 200 {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(200).collect();
    format!("{}...", cut)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Cannot load environment file: {0}")]
    EnvFile(String),
}
