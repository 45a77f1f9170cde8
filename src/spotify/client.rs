use std::{collections::HashSet, sync::Arc};

use crate::{
    error::{ServiceError, ServiceResult},
    logger::Logger,
    types::{Artist, Page, Playlist, Token, Track, TrackObject, UserProfile},
    utils,
};

use super::RemoteApi;

/// Largest page the library endpoints hand out.
pub const MAX_PAGE_SIZE: u32 = 50;
/// Track uris per "add items to playlist" call.
pub const ADD_ITEMS_CHUNK: usize = 100;
/// Ids per "remove saved tracks" / "unfollow artists" call.
pub const REMOVE_CHUNK: usize = 50;
/// Tracks searched per artist when removing liked tracks by artist.
pub const ARTIST_TRACKS_SEARCH_LIMIT: u32 = 50;

/// The service client: one method per user-facing capability.
///
/// A client is cheap to build and is meant to live for a single request. It
/// is bound to at most one [`Token`]; every operation except
/// [`authorize_url`](Self::authorize_url) and
/// [`exchange_code`](Self::exchange_code) fails with
/// [`ServiceError::NotAuthenticated`] while it holds none.
pub struct SpotifyClient {
    api: Arc<dyn RemoteApi>,
    logger: Arc<dyn Logger>,
    token: Option<Token>,
}

impl SpotifyClient {
    pub fn new(api: Arc<dyn RemoteApi>, logger: Arc<dyn Logger>) -> Self {
        Self {
            api,
            logger,
            token: None,
        }
    }

    pub fn with_token(api: Arc<dyn RemoteApi>, logger: Arc<dyn Logger>, token: Token) -> Self {
        Self {
            api,
            logger,
            token: Some(token),
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn access_token(&self) -> ServiceResult<&str> {
        self.token
            .as_ref()
            .map(|t| t.access_token.as_str())
            .ok_or(ServiceError::NotAuthenticated)
    }

    pub fn authorize_url(&self, state: &str) -> String {
        self.api.authorize_url(state)
    }

    /// Trades an authorization code for a token and binds the client to it.
    pub async fn exchange_code(&mut self, code: &str) -> ServiceResult<Token> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::Auth("missing authorization code".to_string()));
        }

        let response = self.api.exchange_code(code).await?;
        let token = Token::from_response(response, now());
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Refreshes the bound token when it is about to expire.
    ///
    /// Returns `true` when a new token was obtained. The refresh token is kept
    /// when the accounts service does not hand out a new one.
    pub async fn refresh_if_expired(&mut self, now: u64) -> ServiceResult<bool> {
        let current = self.token.as_ref().ok_or(ServiceError::NotAuthenticated)?;
        if !current.is_expired(now) {
            return Ok(false);
        }
        if current.refresh_token.is_empty() {
            return Err(ServiceError::Auth("token expired and cannot be refreshed".to_string()));
        }

        let response = self.api.refresh_token(&current.refresh_token).await?;
        let mut token = Token::from_response(response, now);
        if token.refresh_token.is_empty() {
            token.refresh_token = current.refresh_token.clone();
        }
        self.token = Some(token);
        Ok(true)
    }

    pub async fn revoke(&self, token: &Token) -> ServiceResult<()> {
        self.api.revoke_token(&token.access_token).await
    }

    pub async fn current_user(&self) -> ServiceResult<UserProfile> {
        let token = self.access_token()?;
        Ok(self.api.current_user(token).await?.into())
    }

    /// Builds a playlist out of the top tracks of each named artist.
    ///
    /// Each name is resolved to the first artist search result. Names without
    /// a match are skipped with a warning; the union of all top tracks (without
    /// duplicates) goes into a new playlist owned by the current user.
    pub async fn create_playlist(&self, name: &str, artist_names: &[String]) -> ServiceResult<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("A playlist name is required.".to_string()));
        }
        let artist_names: Vec<&str> = artist_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if artist_names.is_empty() {
            return Err(ServiceError::Validation("At least one artist is required.".to_string()));
        }

        let token = self.access_token()?;

        let mut track_ids: Vec<String> = Vec::new();
        for artist_name in artist_names {
            let query = format!("artist:\"{}\"", artist_name);
            let found = self.api.search_artists(token, &query, 1).await?;
            let Some(artist) = found.into_iter().next() else {
                self.logger
                    .warn(&format!("Artist '{}' not found, skipping it", artist_name));
                continue;
            };

            let top_tracks = self.api.artist_top_tracks(token, &artist.id).await?;
            self.logger.info(&format!(
                "Found {} top tracks for '{}'",
                top_tracks.len(),
                artist.name
            ));
            track_ids.extend(top_tracks.into_iter().filter_map(|t| t.id));
        }

        utils::remove_duplicate_ids(&mut track_ids);
        if track_ids.is_empty() {
            return Err(ServiceError::EmptyResult(
                "No tracks found to add to the playlist.".to_string(),
            ));
        }

        let user = self.api.current_user(token).await?;
        let created = self.api.create_playlist(token, &user.id, name).await?;

        let uris: Vec<String> = track_ids
            .iter()
            .map(|id| format!("spotify:track:{}", id))
            .collect();
        for chunk in uris.chunks(ADD_ITEMS_CHUNK) {
            self.api.add_playlist_items(token, &created.id, chunk).await?;
        }

        self.logger.info(&format!(
            "Playlist '{}' created with {} tracks",
            created.name,
            track_ids.len()
        ));

        Ok(Playlist {
            id: created.id,
            name: created.name,
            item_count: track_ids.len() as u64,
        })
    }

    pub async fn remove_playlist(&self, id: &str) -> ServiceResult<()> {
        if id.trim().is_empty() {
            return Err(ServiceError::Validation("A playlist id is required.".to_string()));
        }
        let token = self.access_token()?;
        self.api.unfollow_playlist(token, id).await?;
        self.logger.info(&format!("Playlist {} removed", id));
        Ok(())
    }

    /// One page of liked tracks together with the library size.
    pub async fn liked_tracks_page(&self, limit: u32, offset: u32) -> ServiceResult<Page<Track>> {
        let token = self.access_token()?;
        let page = self
            .api
            .saved_tracks(token, clamp_limit(limit), offset)
            .await?;
        Ok(Page {
            items: project_tracks(page.items.iter().map(|s| &s.track)),
            total: page.total,
        })
    }

    /// Liked tracks in library order; an empty page is an error.
    pub async fn list_liked_tracks(&self, limit: u32, offset: u32) -> ServiceResult<Vec<Track>> {
        let page = self.liked_tracks_page(limit, offset).await?;
        if page.items.is_empty() {
            return Err(ServiceError::EmptyResult("No liked tracks found.".to_string()));
        }
        Ok(page.items)
    }

    pub async fn liked_tracks_total(&self) -> ServiceResult<u64> {
        let token = self.access_token()?;
        Ok(self.api.saved_tracks(token, 1, 0).await?.total)
    }

    /// Removes liked tracks and returns how many removals were requested.
    ///
    /// Pass explicit `track_ids`, or `artist_names` to remove every track a
    /// search by artist turns up (up to 50 per artist). With neither, the
    /// first page of the library is removed.
    pub async fn remove_liked_tracks(
        &self,
        track_ids: Option<&[String]>,
        artist_names: Option<&[String]>,
    ) -> ServiceResult<usize> {
        let ids: Vec<String> = match (track_ids, artist_names) {
            (Some(_), Some(_)) => {
                return Err(ServiceError::Validation(
                    "Remove either selected tracks or tracks by artist, not both.".to_string(),
                ));
            }
            (Some(ids), None) => {
                let mut ids: Vec<String> = ids
                    .iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect();
                utils::remove_duplicate_ids(&mut ids);
                if ids.is_empty() {
                    return Err(ServiceError::Validation(
                        "No tracks selected for removal.".to_string(),
                    ));
                }
                ids
            }
            (None, Some(names)) => {
                let names: Vec<&str> = names
                    .iter()
                    .map(|n| n.trim())
                    .filter(|n| !n.is_empty())
                    .collect();
                if names.is_empty() {
                    return Err(ServiceError::Validation("An artist name is required.".to_string()));
                }
                let mut ids = Vec::new();
                for name in names {
                    let tracks = self
                        .search_artist_tracks(name, ARTIST_TRACKS_SEARCH_LIMIT)
                        .await?;
                    if tracks.is_empty() {
                        self.logger
                            .warn(&format!("No tracks found for artist '{}'", name));
                    }
                    ids.extend(tracks.into_iter().map(|t| t.id));
                }
                utils::remove_duplicate_ids(&mut ids);
                ids
            }
            (None, None) => {
                self.liked_tracks_page(MAX_PAGE_SIZE, 0)
                    .await?
                    .items
                    .into_iter()
                    .map(|t| t.id)
                    .collect()
            }
        };

        let token = self.access_token()?;
        for chunk in ids.chunks(REMOVE_CHUNK) {
            self.api.remove_saved_tracks(token, chunk).await?;
        }
        self.logger
            .info(&format!("Removed {} tracks from the library", ids.len()));
        Ok(ids.len())
    }

    pub async fn search_artist_tracks(&self, artist_name: &str, limit: u32) -> ServiceResult<Vec<Track>> {
        let token = self.access_token()?;
        let query = format!("artist:\"{}\"", artist_name.trim());
        let found = self
            .api
            .search_tracks(token, &query, clamp_limit(limit))
            .await?;
        Ok(project_tracks(found.iter()))
    }

    /// Artists appearing on one page of liked tracks, first-seen order.
    ///
    /// These are artists whose tracks the user liked, not the artists the
    /// user follows; see [`list_followed_artists`](Self::list_followed_artists).
    pub async fn list_liked_artists(&self, limit: u32, offset: u32) -> ServiceResult<Vec<Artist>> {
        let token = self.access_token()?;
        let page = self
            .api
            .saved_tracks(token, clamp_limit(limit), offset)
            .await?;

        let mut seen = HashSet::new();
        let artists = page
            .items
            .iter()
            .flat_map(|saved| saved.track.artists.iter())
            .filter_map(|a| {
                let id = a.id.clone()?;
                seen.insert(id.clone()).then(|| Artist {
                    id,
                    name: a.name.clone(),
                })
            })
            .collect();
        Ok(artists)
    }

    /// Artists the user follows, with the cursor of the next page.
    pub async fn list_followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> ServiceResult<(Vec<Artist>, Option<String>)> {
        let token = self.access_token()?;
        let page = self
            .api
            .followed_artists(token, clamp_limit(limit), after)
            .await?;
        let next = page.cursors.and_then(|c| c.after);
        Ok((page.items.into_iter().map(Artist::from).collect(), next))
    }

    pub async fn user_playlists_page(&self, limit: u32, offset: u32) -> ServiceResult<Page<Playlist>> {
        let token = self.access_token()?;
        let page = self
            .api
            .user_playlists(token, clamp_limit(limit), offset)
            .await?;
        Ok(Page {
            items: page.items.into_iter().map(Playlist::from).collect(),
            total: page.total,
        })
    }

    pub async fn list_user_playlists(&self, limit: u32, offset: u32) -> ServiceResult<Vec<Playlist>> {
        Ok(self.user_playlists_page(limit, offset).await?.items)
    }

    pub async fn user_playlist_total(&self) -> ServiceResult<u64> {
        let token = self.access_token()?;
        Ok(self.api.user_playlists(token, 1, 0).await?.total)
    }

    pub async fn unfollow_artists(&self, ids: &[String]) -> ServiceResult<()> {
        let mut ids: Vec<String> = ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(ServiceError::Validation("No artists selected.".to_string()));
        }
        utils::remove_duplicate_ids(&mut ids);

        let token = self.access_token()?;
        for chunk in ids.chunks(REMOVE_CHUNK) {
            self.api.unfollow_artists(token, chunk).await?;
        }
        self.logger
            .info(&format!("Unfollowed {} artists", ids.len()));
        Ok(())
    }

    pub async fn top_artists(&self, limit: u32) -> ServiceResult<Vec<Artist>> {
        let token = self.access_token()?;
        let artists = self.api.top_artists(token, clamp_limit(limit)).await?;
        Ok(artists.into_iter().map(Artist::from).collect())
    }

    pub async fn recently_played(&self, limit: u32) -> ServiceResult<Vec<Track>> {
        let token = self.access_token()?;
        let tracks = self.api.recently_played(token, clamp_limit(limit)).await?;
        Ok(project_tracks(tracks.iter()))
    }
}

fn project_tracks<'a>(tracks: impl Iterator<Item = &'a TrackObject>) -> Vec<Track> {
    tracks.filter_map(TrackObject::to_track).collect()
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
