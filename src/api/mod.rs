//! # API Module
//!
//! HTTP handlers of the web application, one per user-facing action.
//!
//! Every handler follows the same shape: resolve the [`Session`], build a
//! [`SpotifyClient`] bound to the session token, make one or more client calls,
//! reshape the result into a view model and render it, or redirect. Any
//! [`ServiceError`] is caught here: it is logged, turned into a flash message
//! and answered with a redirect to a safe page. Nothing is retried.
//!
//! ## Endpoints
//!
//! - [`auth`] - landing page, login, OAuth callback, logout
//! - [`dashboard`] - user overview
//! - [`playlists`] - create, list and remove playlists
//! - [`tracks`] - browse and remove liked tracks
//! - [`artists`] - browse and unfollow artists
//! - [`health`] - health check

mod artists;
mod auth;
mod dashboard;
mod health;
mod playlists;
mod session;
mod tracks;

use axum::response::{Redirect, Response};
use serde::Deserialize;

use crate::{
    error::{ServiceError, ServiceResult},
    server::AppState,
    session::FlashLevel,
    spotify::SpotifyClient,
};

pub use artists::{
    CursorQuery, followed_artists, liked_artists, unfollow_followed_artists, unfollow_selected_artists,
};
pub use auth::{CallbackParams, back, callback, home, login, logout};
pub use dashboard::dashboard;
pub use health::health;
pub use playlists::{create_playlist, create_playlist_form, remove_playlist, view_playlists};
pub use session::Session;
pub use tracks::{
    PageQuery, liked_tracks, remove_liked_tracks, remove_liked_tracks_page, remove_selected_tracks,
    remove_tracks_by_artist, update_tracks,
};

/// Query string accepted by the browsing pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    pub sort: Option<String>,
    pub artist: Option<String>,
    pub search: Option<String>,
}

/// Builds a client bound to the session token.
///
/// A token close to expiry is refreshed first and written back to the
/// session. When that fails the token is dropped and the user has to log in
/// again.
pub(crate) async fn session_client(
    state: &AppState,
    session: &mut Session,
) -> ServiceResult<SpotifyClient> {
    let token = session
        .data
        .token
        .clone()
        .ok_or(ServiceError::NotAuthenticated)?;
    let mut client = SpotifyClient::with_token(state.api.clone(), state.logger.clone(), token);

    match client.refresh_if_expired(chrono::Utc::now().timestamp() as u64).await {
        Ok(true) => {
            state.logger.info("Access token refreshed");
            session.data.token = client.token().cloned();
        }
        Ok(false) => {}
        Err(e) => {
            state
                .logger
                .warn(&format!("Cannot refresh access token: {}", e));
            session.data.token = None;
            return Err(ServiceError::NotAuthenticated);
        }
    }

    Ok(client)
}

/// Answers a failed request: log, flash, redirect.
///
/// Missing authentication goes straight to `/login`; anything else is shown
/// to the user and redirects to `fallback`.
pub(crate) async fn fail(
    state: &AppState,
    mut session: Session,
    err: ServiceError,
    context: &str,
    fallback: &str,
) -> Response {
    if let ServiceError::NotAuthenticated = err {
        return session.commit(state, Redirect::to("/login")).await;
    }

    state.logger.error(&format!("{}: {}", context, err));
    session.flash(FlashLevel::Error, err.user_message());
    session.commit(state, Redirect::to(fallback)).await
}

/// Values of a repeated form field, in submission order.
pub(crate) fn form_values(pairs: &[(String, String)], name: &str) -> Vec<String> {
    pairs
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

pub(crate) fn form_value(pairs: &[(String, String)], name: &str) -> Option<String> {
    form_values(pairs, name).into_iter().next()
}
