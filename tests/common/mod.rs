#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use likedeck::{
    api::Session,
    error::{ServiceError, ServiceResult},
    logger::{Level, Logger},
    server::AppState,
    session::{CookieSigner, MemorySessionStore, SessionStore},
    spotify::{RemoteApi, SpotifyClient},
    types::{
        ArtistObject, CreatedPlaylistObject, CursorPagingObject, Cursors, PagingObject,
        PlaylistObject, PlaylistTracksRef, SavedTrackObject, SimpleArtistObject, Token,
        TokenResponse, TrackObject, UserObject,
    },
};

pub const SECRET: &str = "test-session-secret-0123456789";

// Helper function to create a remote track with one artist
pub fn track(id: &str, name: &str, artist: &str) -> TrackObject {
    TrackObject {
        id: Some(id.to_string()),
        name: name.to_string(),
        artists: vec![SimpleArtistObject {
            id: Some(format!("{}_id", artist.to_lowercase().replace(' ', "_"))),
            name: artist.to_string(),
        }],
    }
}

pub fn artist(id: &str, name: &str) -> ArtistObject {
    ArtistObject {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn playlist(id: &str, name: &str, total: u64) -> PlaylistObject {
    PlaylistObject {
        id: id.to_string(),
        name: name.to_string(),
        tracks: PlaylistTracksRef { total },
    }
}

/// A token valid for another hour.
pub fn fresh_token() -> Token {
    Token {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: now() + 3600,
    }
}

pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

/// Everything the fake knows and everything it was asked to do.
#[derive(Debug, Default)]
pub struct FakeState {
    pub user: Option<UserObject>,
    pub artists: Vec<ArtistObject>,
    pub top_tracks: HashMap<String, Vec<TrackObject>>,
    pub tracks_by_artist: HashMap<String, Vec<TrackObject>>,
    pub saved: Vec<TrackObject>,
    pub playlists: Vec<PlaylistObject>,
    pub followed: Vec<ArtistObject>,
    pub top_artists: Vec<ArtistObject>,
    pub recent: Vec<TrackObject>,

    pub token_response: Option<TokenResponse>,
    pub refresh_response: Option<TokenResponse>,

    /// Call names answered with a remote failure.
    pub failing: HashSet<&'static str>,
    /// Call names answered with 401.
    pub unauthorized: HashSet<&'static str>,

    pub calls: Vec<&'static str>,
    pub exchanged_codes: Vec<String>,
    pub revoked: Vec<String>,
    pub created_playlists: Vec<(String, String)>,
    pub added_items: Vec<(String, Vec<String>)>,
    pub removed_saved: Vec<Vec<String>>,
    pub unfollowed_playlists: Vec<String>,
    pub unfollowed_artists: Vec<Vec<String>>,
    pub access_tokens_seen: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.with(|s| {
            s.user = Some(UserObject {
                id: "user-1".to_string(),
                display_name: Some("Ana".to_string()),
                images: Vec::new(),
            });
        });
        fake
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.with(|s| s.calls.clone())
    }

    /// Registers an artist and its top tracks.
    pub fn add_artist(&self, id: &str, name: &str, top: Vec<TrackObject>) {
        self.with(|s| {
            s.artists.push(artist(id, name));
            s.top_tracks.insert(id.to_string(), top);
        });
    }

    fn enter(&self, call: &'static str, access_token: Option<&str>) -> ServiceResult<()> {
        self.with(|s| {
            s.calls.push(call);
            if let Some(token) = access_token {
                s.access_tokens_seen.push(token.to_string());
            }
            if s.unauthorized.contains(call) {
                return Err(ServiceError::NotAuthenticated);
            }
            if s.failing.contains(call) {
                return Err(ServiceError::Remote(format!("{} failed", call)));
            }
            Ok(())
        })
    }
}

fn quoted_name(query: &str) -> String {
    query
        .trim_start_matches("artist:")
        .trim_matches('"')
        .to_lowercase()
}

#[async_trait]
impl RemoteApi for FakeApi {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example/authorize?client_id=test&state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<TokenResponse> {
        self.enter("exchange_code", None)?;
        self.with(|s| {
            s.exchanged_codes.push(code.to_string());
            s.token_response
                .clone()
                .ok_or_else(|| ServiceError::Auth("invalid_grant".to_string()))
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> ServiceResult<TokenResponse> {
        self.enter("refresh_token", None)?;
        self.with(|s| {
            s.refresh_response
                .clone()
                .ok_or_else(|| ServiceError::Auth("invalid_grant".to_string()))
        })
    }

    async fn revoke_token(&self, access_token: &str) -> ServiceResult<()> {
        if self.enter("revoke_token", None).is_err() {
            return Err(ServiceError::Auth("revocation answered 400".to_string()));
        }
        self.with(|s| s.revoked.push(access_token.to_string()));
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> ServiceResult<UserObject> {
        self.enter("current_user", Some(access_token))?;
        self.with(|s| {
            s.user
                .clone()
                .ok_or_else(|| ServiceError::NotFound("User".to_string()))
        })
    }

    async fn search_artists(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<ArtistObject>> {
        self.enter("search_artists", Some(access_token))?;
        let name = quoted_name(query);
        Ok(self.with(|s| {
            s.artists
                .iter()
                .filter(|a| a.name.to_lowercase() == name)
                .take(limit as usize)
                .cloned()
                .collect()
        }))
    }

    async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>> {
        self.enter("search_tracks", Some(access_token))?;
        let name = quoted_name(query);
        Ok(self.with(|s| {
            s.tracks_by_artist
                .get(&name)
                .map(|t| t.iter().take(limit as usize).cloned().collect())
                .unwrap_or_default()
        }))
    }

    async fn artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> ServiceResult<Vec<TrackObject>> {
        self.enter("artist_top_tracks", Some(access_token))?;
        self.with(|s| {
            s.top_tracks
                .get(artist_id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound("Artist".to_string()))
        })
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> ServiceResult<CreatedPlaylistObject> {
        self.enter("create_playlist", Some(access_token))?;
        Ok(self.with(|s| {
            s.created_playlists
                .push((user_id.to_string(), name.to_string()));
            CreatedPlaylistObject {
                id: format!("pl-{}", s.created_playlists.len()),
                name: name.to_string(),
            }
        }))
    }

    async fn add_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> ServiceResult<()> {
        self.enter("add_playlist_items", Some(access_token))?;
        self.with(|s| {
            s.added_items
                .push((playlist_id.to_string(), uris.to_vec()))
        });
        Ok(())
    }

    async fn unfollow_playlist(&self, access_token: &str, playlist_id: &str) -> ServiceResult<()> {
        self.enter("unfollow_playlist", Some(access_token))?;
        self.with(|s| {
            s.unfollowed_playlists.push(playlist_id.to_string());
            s.playlists.retain(|p| p.id != playlist_id);
        });
        Ok(())
    }

    async fn saved_tracks(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<SavedTrackObject>> {
        self.enter("saved_tracks", Some(access_token))?;
        Ok(self.with(|s| PagingObject {
            items: s
                .saved
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .map(|track| SavedTrackObject { track })
                .collect(),
            total: s.saved.len() as u64,
        }))
    }

    async fn remove_saved_tracks(&self, access_token: &str, ids: &[String]) -> ServiceResult<()> {
        self.enter("remove_saved_tracks", Some(access_token))?;
        self.with(|s| {
            s.removed_saved.push(ids.to_vec());
            s.saved
                .retain(|t| t.id.as_ref().is_none_or(|id| !ids.contains(id)));
        });
        Ok(())
    }

    async fn user_playlists(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<PlaylistObject>> {
        self.enter("user_playlists", Some(access_token))?;
        Ok(self.with(|s| PagingObject {
            items: s
                .playlists
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
            total: s.playlists.len() as u64,
        }))
    }

    async fn followed_artists(
        &self,
        access_token: &str,
        limit: u32,
        after: Option<&str>,
    ) -> ServiceResult<CursorPagingObject<ArtistObject>> {
        self.enter("followed_artists", Some(access_token))?;
        Ok(self.with(|s| {
            let start = after
                .and_then(|a| s.followed.iter().position(|f| f.id == a))
                .map(|p| p + 1)
                .unwrap_or(0);
            let items: Vec<ArtistObject> = s
                .followed
                .iter()
                .skip(start)
                .take(limit as usize)
                .cloned()
                .collect();
            let has_more = start + items.len() < s.followed.len();
            CursorPagingObject {
                cursors: Some(Cursors {
                    after: if has_more {
                        items.last().map(|a| a.id.clone())
                    } else {
                        None
                    },
                }),
                total: Some(s.followed.len() as u64),
                items,
            }
        }))
    }

    async fn unfollow_artists(&self, access_token: &str, ids: &[String]) -> ServiceResult<()> {
        self.enter("unfollow_artists", Some(access_token))?;
        self.with(|s| {
            s.unfollowed_artists.push(ids.to_vec());
            s.followed.retain(|a| !ids.contains(&a.id));
        });
        Ok(())
    }

    async fn top_artists(
        &self,
        access_token: &str,
        limit: u32,
    ) -> ServiceResult<Vec<ArtistObject>> {
        self.enter("top_artists", Some(access_token))?;
        Ok(self.with(|s| s.top_artists.iter().take(limit as usize).cloned().collect()))
    }

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>> {
        self.enter("recently_played", Some(access_token))?;
        Ok(self.with(|s| s.recent.iter().take(limit as usize).cloned().collect()))
    }
}

/// Keeps every log line for later inspection.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub logger: Arc<RecordingLogger>,
    pub sessions: Arc<MemorySessionStore>,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_sessions(MemorySessionStore::new())
    }

    pub fn with_sessions(sessions: MemorySessionStore) -> Self {
        let api = Arc::new(FakeApi::new());
        let logger = Arc::new(RecordingLogger::default());
        let sessions = Arc::new(sessions);
        let state = AppState::new(
            api.clone(),
            sessions.clone(),
            logger.clone(),
            CookieSigner::new(SECRET).unwrap(),
        );
        Self {
            api,
            logger,
            sessions,
            state,
        }
    }

    /// Client bound to a valid token.
    pub fn client(&self) -> SpotifyClient {
        SpotifyClient::with_token(self.api.clone(), self.logger.clone(), fresh_token())
    }

    pub fn anonymous_client(&self) -> SpotifyClient {
        SpotifyClient::new(self.api.clone(), self.logger.clone())
    }

    /// A new session with a valid token, plus its id.
    pub async fn signed_in(&self) -> (Session, String) {
        let mut session = Session::load(&self.state, None).await;
        session.data.token = Some(fresh_token());
        let id = session.id().to_string();
        (session, id)
    }

    pub async fn anonymous(&self) -> Session {
        Session::load(&self.state, None).await
    }

    /// Session data stored under `id` after a handler committed it.
    pub async fn stored(&self, id: &str) -> likedeck::session::SessionData {
        self.sessions
            .get(id)
            .await
            .expect("session should have been stored")
    }
}
