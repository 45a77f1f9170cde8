use axum::{extract::State, response::Response};

use crate::{server::AppState, views};

use super::{Session, fail, session_client};

const DASHBOARD_LIST_SIZE: u32 = 5;

/// User overview. Only the profile is required; the lists degrade to empty
/// and the counters are left out when Spotify refuses them.
pub async fn dashboard(State(state): State<AppState>, mut session: Session) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot open dashboard", "/").await,
    };

    let user = match client.current_user().await {
        Ok(user) => user,
        Err(e) => return fail(&state, session, e, "Cannot load user profile", "/").await,
    };

    let top_artists = client
        .top_artists(DASHBOARD_LIST_SIZE)
        .await
        .unwrap_or_else(|e| {
            state.logger.warn(&format!("Cannot load top artists: {}", e));
            Vec::new()
        });
    let recent_tracks = client
        .recently_played(DASHBOARD_LIST_SIZE)
        .await
        .unwrap_or_else(|e| {
            state
                .logger
                .warn(&format!("Cannot load recently played tracks: {}", e));
            Vec::new()
        });

    let liked_track_count = match client.liked_tracks_total().await {
        Ok(total) => Some(total),
        Err(e) => {
            state.logger.warn(&format!("Cannot count liked tracks: {}", e));
            None
        }
    };
    let playlist_count = match client.user_playlist_total().await {
        Ok(total) => Some(total),
        Err(e) => {
            state.logger.warn(&format!("Cannot count playlists: {}", e));
            None
        }
    };

    let view = views::DashboardView {
        user_name: user.display_name,
        user_image: user
            .image_url
            .unwrap_or_else(|| views::DEFAULT_USER_IMAGE.to_string()),
        top_artists,
        recent_tracks,
        liked_track_count,
        playlist_count,
    };

    let flashes = session.data.take_flashes();
    session
        .commit(&state, views::dashboard(&flashes, &view))
        .await
}
