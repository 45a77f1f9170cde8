//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify accounts service and Web API.
//!
//! ```text
//! Web handlers
//!      ↓
//! SpotifyClient   (session-bound operations, validation, reshaping)
//!      ↓
//! RemoteApi       (one method per endpoint, typed payloads)
//!      ↓
//! HttpApi         (reqwest, JSON)
//!      ↓
//! Spotify accounts service / Web API
//! ```
//!
//! [`RemoteApi`] is the seam between the two layers: [`HttpApi`] implements it
//! over HTTP and tests substitute an in-memory double. Every method returns a
//! [`ServiceResult`] so callers see one error taxonomy no matter which layer
//! failed.
//!
//! ## Endpoints
//!
//! - `POST /api/token` - code exchange and refresh
//! - `POST /api/token/revoke` - token revocation
//! - `GET /me`, `GET /me/top/artists`, `GET /me/player/recently-played`
//! - `GET /search` - artists and tracks
//! - `GET /artists/{id}/top-tracks`
//! - `GET|DELETE /me/tracks` - liked tracks
//! - `GET /me/playlists`, `POST /users/{id}/playlists`,
//!   `POST /playlists/{id}/tracks`, `DELETE /playlists/{id}/followers`
//! - `GET|DELETE /me/following` - followed artists

mod client;
mod http;

use async_trait::async_trait;

use crate::{
    error::ServiceResult,
    types::{
        ArtistObject, CreatedPlaylistObject, CursorPagingObject, PagingObject, PlaylistObject,
        SavedTrackObject, TokenResponse, TrackObject, UserObject,
    },
};

pub use client::{
    ADD_ITEMS_CHUNK, ARTIST_TRACKS_SEARCH_LIMIT, MAX_PAGE_SIZE, REMOVE_CHUNK, SpotifyClient,
};
pub use http::HttpApi;

/// Raw Spotify endpoints, one method per call.
///
/// Methods taking an `access_token` talk to the Web API, the others to the
/// accounts service.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// URL the browser is sent to for the authorization-code flow.
    fn authorize_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> ServiceResult<TokenResponse>;

    async fn refresh_token(&self, refresh_token: &str) -> ServiceResult<TokenResponse>;

    async fn revoke_token(&self, access_token: &str) -> ServiceResult<()>;

    async fn current_user(&self, access_token: &str) -> ServiceResult<UserObject>;

    async fn search_artists(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<ArtistObject>>;

    async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>>;

    async fn artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> ServiceResult<Vec<TrackObject>>;

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> ServiceResult<CreatedPlaylistObject>;

    /// At most 100 uris per call.
    async fn add_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> ServiceResult<()>;

    async fn unfollow_playlist(&self, access_token: &str, playlist_id: &str) -> ServiceResult<()>;

    async fn saved_tracks(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<SavedTrackObject>>;

    /// At most 50 ids per call.
    async fn remove_saved_tracks(&self, access_token: &str, ids: &[String]) -> ServiceResult<()>;

    async fn user_playlists(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<PlaylistObject>>;

    async fn followed_artists(
        &self,
        access_token: &str,
        limit: u32,
        after: Option<&str>,
    ) -> ServiceResult<CursorPagingObject<ArtistObject>>;

    /// At most 50 ids per call.
    async fn unfollow_artists(&self, access_token: &str, ids: &[String]) -> ServiceResult<()>;

    async fn top_artists(&self, access_token: &str, limit: u32)
    -> ServiceResult<Vec<ArtistObject>>;

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>>;
}
