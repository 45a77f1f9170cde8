//! Server-side sessions.
//!
//! A browser only holds a signed session id (see [`cookie`]); everything else,
//! the Spotify token included, lives in a [`SessionStore`] keyed by that id.

pub mod cookie;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Token;

pub use cookie::CookieSigner;
pub use memory::MemorySessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: Option<Token>,
    pub oauth_state: Option<String>,
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}

/// Storage for session data, keyed by an opaque session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<SessionData>;

    async fn set(&self, id: &str, data: SessionData);

    async fn clear(&self, id: &str);
}
