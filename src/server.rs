use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    api,
    config::Config,
    error::ConfigError,
    logger::Logger,
    session::{CookieSigner, MemorySessionStore, SessionStore},
    spotify::{HttpApi, RemoteApi},
};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn RemoteApi>,
    pub sessions: Arc<dyn SessionStore>,
    pub logger: Arc<dyn Logger>,
    pub signer: CookieSigner,
}

impl AppState {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        sessions: Arc<dyn SessionStore>,
        logger: Arc<dyn Logger>,
        signer: CookieSigner,
    ) -> Self {
        Self {
            api,
            sessions,
            logger,
            signer,
        }
    }

    /// Production wiring: HTTP client and in-memory sessions.
    pub fn from_config(config: &Config, logger: Arc<dyn Logger>) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(HttpApi::new(config)?),
            Arc::new(MemorySessionStore::new()),
            logger,
            CookieSigner::new(&config.session_secret)?,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::home))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout).post(api::logout))
        .route("/dashboard", get(api::dashboard))
        .route("/back", get(api::back))
        .route(
            "/create_playlist",
            get(api::create_playlist_form).post(api::create_playlist),
        )
        .route("/view_playlists", get(api::view_playlists))
        .route("/view_playlists/{page}", get(api::view_playlists))
        .route("/remove_playlist/{id}", post(api::remove_playlist))
        .route("/update_tracks", get(api::update_tracks))
        .route("/remove_tracks_by_artist", post(api::remove_tracks_by_artist))
        .route(
            "/remove_liked_tracks",
            get(api::remove_liked_tracks_page).post(api::remove_liked_tracks),
        )
        .route(
            "/liked_tracks",
            get(api::liked_tracks).post(api::remove_selected_tracks),
        )
        .route(
            "/liked_tracks/{page}",
            get(api::liked_tracks).post(api::remove_selected_tracks),
        )
        .route(
            "/liked_artists",
            get(api::liked_artists).post(api::unfollow_selected_artists),
        )
        .route(
            "/liked_artists/{page}",
            get(api::liked_artists).post(api::unfollow_selected_artists),
        )
        .route(
            "/followed_artists",
            get(api::followed_artists).post(api::unfollow_followed_artists),
        )
        .with_state(state)
}

pub async fn start_api_server(address: &str, state: AppState) -> Result<(), String> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address '{}': {}", address, e))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    state.logger.info(&format!("Listening on http://{}", addr));

    axum::serve(listener, router(state))
        .await
        .map_err(|e| format!("Server error: {}", e))
}
