use axum::{
    extract::{Query, State},
    response::{Redirect, Response},
};
use serde::Deserialize;

use crate::{
    error::ServiceError,
    server::AppState,
    session::FlashLevel,
    spotify::SpotifyClient,
    utils, views,
};

use super::Session;

const OAUTH_STATE_LEN: usize = 24;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn home(State(state): State<AppState>, mut session: Session) -> Response {
    let flashes = session.data.take_flashes();
    session.commit(&state, views::home(&flashes)).await
}

pub async fn back() -> Redirect {
    Redirect::to("/dashboard")
}

/// Sends the browser to the Spotify consent page.
pub async fn login(State(state): State<AppState>, mut session: Session) -> Response {
    let oauth_state = utils::generate_random_token(OAUTH_STATE_LEN);
    let client = SpotifyClient::new(state.api.clone(), state.logger.clone());
    let auth_url = client.authorize_url(&oauth_state);

    session.data.oauth_state = Some(oauth_state);
    session.commit(&state, Redirect::to(&auth_url)).await
}

/// Completes the authorization-code flow and stores the token in the session.
pub async fn callback(
    State(state): State<AppState>,
    mut session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    let expected_state = session.data.oauth_state.take();

    if let Some(reason) = params.error {
        state
            .logger
            .warn(&format!("Spotify authorization was declined: {}", reason));
        session.flash(FlashLevel::Error, "Spotify authorization was declined.");
        return session.commit(&state, Redirect::to("/")).await;
    }

    if expected_state.is_none() || params.state != expected_state {
        state
            .logger
            .error("OAuth state mismatch on callback, rejecting it");
        let err = ServiceError::Auth("state mismatch".to_string());
        session.flash(FlashLevel::Error, err.user_message());
        return session.commit(&state, Redirect::to("/")).await;
    }

    let mut client = SpotifyClient::new(state.api.clone(), state.logger.clone());
    match client.exchange_code(params.code.as_deref().unwrap_or_default()).await {
        Ok(token) => {
            state.logger.info("Spotify authorization completed");
            // Signing in moves the browser to a new session id.
            session.reset(&state).await;
            session.data.token = Some(token);
            session.commit(&state, Redirect::to("/dashboard")).await
        }
        Err(e) => {
            state
                .logger
                .error(&format!("Cannot obtain the access token: {}", e));
            session.flash(FlashLevel::Error, "Could not obtain the Spotify token.");
            session.commit(&state, Redirect::to("/")).await
        }
    }
}

/// Ends the session. Revocation is best-effort.
pub async fn logout(State(state): State<AppState>, mut session: Session) -> Response {
    state.logger.info("Logout started");

    if let Some(token) = session.data.token.take() {
        let client = SpotifyClient::new(state.api.clone(), state.logger.clone());
        if let Err(e) = client.revoke(&token).await {
            state
                .logger
                .warn(&format!("Cannot revoke the access token: {}", e));
        }
    }

    session.reset(&state).await;
    state.logger.info("Session closed");
    session.flash(FlashLevel::Success, "Session closed successfully.");
    session.commit(&state, Redirect::to("/")).await
}
