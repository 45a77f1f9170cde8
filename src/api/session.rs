use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::{
    server::AppState,
    session::{FlashLevel, SessionData, cookie},
    utils,
};

const SESSION_ID_LEN: usize = 32;

/// The browser session of the current request.
///
/// Extracted from the signed session cookie. Changes to [`Session::data`] are
/// only kept once the handler hands its response to [`Session::commit`].
#[derive(Debug)]
pub struct Session {
    id: String,
    is_new: bool,
    pub data: SessionData,
}

impl Session {
    /// Resolves the session named by a `Cookie` header, or starts a new one.
    ///
    /// Unsigned, tampered or unknown ids all lead to a fresh session.
    pub async fn load(state: &AppState, cookie_header: Option<&str>) -> Self {
        let known = cookie_header
            .and_then(|h| cookie::find_cookie(h, cookie::SESSION_COOKIE))
            .and_then(|value| state.signer.verify(value));

        if let Some(id) = known {
            if let Some(data) = state.sessions.get(&id).await {
                return Self {
                    id,
                    is_new: false,
                    data,
                };
            }
        }

        Self::fresh()
    }

    fn fresh() -> Self {
        Self {
            id: utils::generate_random_token(SESSION_ID_LEN),
            is_new: true,
            data: SessionData::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.data.flash(level, message);
    }

    /// Drops everything stored for this session and continues under a new id.
    pub async fn reset(&mut self, state: &AppState) {
        state.sessions.clear(&self.id).await;
        *self = Self::fresh();
    }

    /// Stores the session data and attaches the cookie for new sessions.
    ///
    /// A new session that carries nothing is neither stored nor sent.
    pub async fn commit(self, state: &AppState, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new && self.data == SessionData::default() {
            return response;
        }

        state.sessions.set(&self.id, self.data).await;
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&state.signer.set_cookie(&self.id)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());
        Ok(Session::load(state, header).await)
    }
}
