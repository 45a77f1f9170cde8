use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::{ConfigError, ServiceError, ServiceResult},
    types::{
        AddItemsRequest, ArtistObject, ArtistSearchResponse, CreatePlaylistRequest,
        CreatedPlaylistObject, CursorPagingObject, FollowedArtistsResponse, IdsRequest,
        ItemsObject, PagingObject, PlayHistoryObject, PlaylistObject, SavedTrackObject,
        TokenResponse, TopTracksResponse, TrackObject, TrackSearchResponse, UserObject,
    },
};

use super::RemoteApi;

/// [`RemoteApi`] over HTTPS with a shared `reqwest` client.
///
/// No retries and no timeouts beyond the client defaults: a failed call is
/// reported to the caller as is.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: Url,
    token_url: String,
    revoke_url: String,
    api_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let auth_url = Url::parse(&config.auth_url).map_err(|e| ConfigError::Invalid {
            key: "SPOTIFY_API_AUTH_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_url,
            token_url: config.token_url.clone(),
            revoke_url: config.revoke_url.clone(),
            api_url: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{uri}{path}", uri = self.api_url, path = path)
    }

    async fn send(request: RequestBuilder) -> ServiceResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::from_status(status, &body))
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> ServiceResult<T> {
        let response = Self::send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> ServiceResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Auth(format!(
                "token endpoint answered {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ServiceError::Auth(format!("malformed token response: {}", e)))
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<TokenResponse> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> ServiceResult<TokenResponse> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn revoke_token(&self, access_token: &str) -> ServiceResult<()> {
        let response = self
            .client
            .post(&self.revoke_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Auth(format!(
                "revocation answered {}",
                status.as_u16()
            )));
        }
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> ServiceResult<UserObject> {
        Self::json(self.client.get(self.endpoint("/me")).bearer_auth(access_token)).await
    }

    async fn search_artists(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<ArtistObject>> {
        let limit = limit.to_string();
        let res: ArtistSearchResponse = Self::json(
            self.client
                .get(self.endpoint("/search"))
                .bearer_auth(access_token)
                .query(&[("q", query), ("type", "artist"), ("limit", &limit)]),
        )
        .await?;
        Ok(res.artists.items)
    }

    async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>> {
        let limit = limit.to_string();
        let res: TrackSearchResponse = Self::json(
            self.client
                .get(self.endpoint("/search"))
                .bearer_auth(access_token)
                .query(&[("q", query), ("type", "track"), ("limit", &limit)]),
        )
        .await?;
        Ok(res.tracks.items)
    }

    async fn artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> ServiceResult<Vec<TrackObject>> {
        let res: TopTracksResponse = Self::json(
            self.client
                .get(self.endpoint(&format!("/artists/{}/top-tracks", artist_id)))
                .bearer_auth(access_token),
        )
        .await?;
        Ok(res.tracks)
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> ServiceResult<CreatedPlaylistObject> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: "Top tracks of your favorite artists".to_string(),
            public: true,
        };
        Self::json(
            self.client
                .post(self.endpoint(&format!("/users/{}/playlists", user_id)))
                .bearer_auth(access_token)
                .json(&body),
        )
        .await
    }

    async fn add_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> ServiceResult<()> {
        let body = AddItemsRequest {
            uris: uris.to_vec(),
        };
        Self::send(
            self.client
                .post(self.endpoint(&format!("/playlists/{}/tracks", playlist_id)))
                .bearer_auth(access_token)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn unfollow_playlist(&self, access_token: &str, playlist_id: &str) -> ServiceResult<()> {
        Self::send(
            self.client
                .delete(self.endpoint(&format!("/playlists/{}/followers", playlist_id)))
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }

    async fn saved_tracks(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<SavedTrackObject>> {
        Self::json(
            self.client
                .get(self.endpoint("/me/tracks"))
                .bearer_auth(access_token)
                .query(&[("limit", limit), ("offset", offset)]),
        )
        .await
    }

    async fn remove_saved_tracks(&self, access_token: &str, ids: &[String]) -> ServiceResult<()> {
        let body = IdsRequest { ids: ids.to_vec() };
        Self::send(
            self.client
                .delete(self.endpoint("/me/tracks"))
                .bearer_auth(access_token)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn user_playlists(
        &self,
        access_token: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<PagingObject<PlaylistObject>> {
        Self::json(
            self.client
                .get(self.endpoint("/me/playlists"))
                .bearer_auth(access_token)
                .query(&[("limit", limit), ("offset", offset)]),
        )
        .await
    }

    async fn followed_artists(
        &self,
        access_token: &str,
        limit: u32,
        after: Option<&str>,
    ) -> ServiceResult<CursorPagingObject<ArtistObject>> {
        let mut request = self
            .client
            .get(self.endpoint("/me/following"))
            .bearer_auth(access_token)
            .query(&[("type", "artist")])
            .query(&[("limit", limit)]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }
        let res: FollowedArtistsResponse = Self::json(request).await?;
        Ok(res.artists)
    }

    async fn unfollow_artists(&self, access_token: &str, ids: &[String]) -> ServiceResult<()> {
        let body = IdsRequest { ids: ids.to_vec() };
        Self::send(
            self.client
                .delete(self.endpoint("/me/following"))
                .bearer_auth(access_token)
                .query(&[("type", "artist")])
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn top_artists(
        &self,
        access_token: &str,
        limit: u32,
    ) -> ServiceResult<Vec<ArtistObject>> {
        let res: ItemsObject<ArtistObject> = Self::json(
            self.client
                .get(self.endpoint("/me/top/artists"))
                .bearer_auth(access_token)
                .query(&[("limit", limit)]),
        )
        .await?;
        Ok(res.items)
    }

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> ServiceResult<Vec<TrackObject>> {
        let res: ItemsObject<PlayHistoryObject> = Self::json(
            self.client
                .get(self.endpoint("/me/player/recently-played"))
                .bearer_auth(access_token)
                .query(&[("limit", limit)]),
        )
        .await?;
        Ok(res.items.into_iter().map(|h| h.track).collect())
    }
}
