use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    server::AppState,
    session::FlashLevel,
    spotify::MAX_PAGE_SIZE,
    utils::{self, TrackSort},
    views,
};

use super::{BrowseQuery, Session, fail, form_value, form_values, session_client};

pub const TRACKS_PER_PAGE: u32 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Liked tracks with filter, sort and pagination over one fetched window.
pub async fn liked_tracks(
    State(state): State<AppState>,
    mut session: Session,
    page: Option<Path<u32>>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot list liked tracks", "/dashboard").await,
    };

    let page = page.map(|Path(p)| p).unwrap_or(1).max(1);

    let tracks = match client.list_liked_tracks(MAX_PAGE_SIZE, 0).await {
        Ok(tracks) => tracks,
        Err(e) => return fail(&state, session, e, "Cannot list liked tracks", "/dashboard").await,
    };

    let mut tracks = utils::filter_tracks(tracks, query.search.as_deref(), query.artist.as_deref());
    if let Some(sort) = query.sort.as_deref().and_then(|s| s.parse::<TrackSort>().ok()) {
        utils::sort_tracks(&mut tracks, sort);
    }

    let view = views::LikedTracksView {
        total_pages: utils::total_pages(tracks.len() as u64, TRACKS_PER_PAGE),
        tracks: utils::paginate(&tracks, page, TRACKS_PER_PAGE),
        page,
        sort: query.sort,
        artist: query.artist,
        search: query.search,
    };

    let flashes = session.data.take_flashes();
    session
        .commit(&state, views::liked_tracks(&flashes, &view))
        .await
}

/// Removes the tracks ticked on a liked-tracks page.
pub async fn remove_selected_tracks(
    State(state): State<AppState>,
    session: Session,
    page: Option<Path<u32>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let page = page.map(|Path(p)| p).unwrap_or(1).max(1);
    let back = format!("/liked_tracks/{}", page);
    remove_ids(state, session, form, &back).await
}

/// Dedicated removal page: 20 liked tracks per remote page.
pub async fn remove_liked_tracks_page(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<PageQuery>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot list liked tracks", "/dashboard").await,
    };

    let page = query.page.unwrap_or(1).max(1);
    let offset = utils::page_offset(page, TRACKS_PER_PAGE);

    match client.liked_tracks_page(TRACKS_PER_PAGE, offset).await {
        Ok(result) => {
            let view = views::RemoveTracksView {
                tracks: result.items,
                page,
                total_pages: utils::total_pages(result.total, TRACKS_PER_PAGE),
            };
            let flashes = session.data.take_flashes();
            session
                .commit(&state, views::remove_tracks(&flashes, &view))
                .await
        }
        Err(e) => fail(&state, session, e, "Cannot list liked tracks", "/dashboard").await,
    }
}

pub async fn remove_liked_tracks(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let back = format!("/remove_liked_tracks?page={}", query.page.unwrap_or(1).max(1));
    remove_ids(state, session, form, &back).await
}

async fn remove_ids(
    state: AppState,
    mut session: Session,
    form: Vec<(String, String)>,
    back: &str,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot remove liked tracks", back).await,
    };

    let track_ids = form_values(&form, "track_ids");
    if track_ids.is_empty() {
        session.flash(FlashLevel::Warning, "No tracks selected for removal.");
        return session.commit(&state, Redirect::to(back)).await;
    }

    match client.remove_liked_tracks(Some(&track_ids), None).await {
        Ok(count) => {
            session.flash(
                FlashLevel::Success,
                format!("{} tracks removed successfully!", count),
            );
            session.commit(&state, Redirect::to(back)).await
        }
        Err(e) => fail(&state, session, e, "Cannot remove liked tracks", back).await,
    }
}

/// Form field: `artist_name`.
pub async fn remove_tracks_by_artist(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    const BACK: &str = "/remove_liked_tracks";

    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot remove tracks by artist", BACK).await,
    };

    let artist_names: Vec<String> = form_value(&form, "artist_name").into_iter().collect();
    match client.remove_liked_tracks(None, Some(&artist_names)).await {
        Ok(count) => {
            session.flash(
                FlashLevel::Success,
                format!(
                    "{} tracks by \"{}\" removed successfully!",
                    count,
                    artist_names.join(", ")
                ),
            );
            session.commit(&state, Redirect::to(BACK)).await
        }
        Err(e) => fail(&state, session, e, "Cannot remove tracks by artist", BACK).await,
    }
}

/// First page of liked tracks as JSON, for client-side refreshes.
pub async fn update_tracks(State(state): State<AppState>, mut session: Session) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot refresh tracks", "/dashboard").await,
    };

    match client.liked_tracks_page(TRACKS_PER_PAGE, 0).await {
        Ok(result) => {
            session
                .commit(&state, Json(json!({ "tracks": result.items })))
                .await
        }
        Err(e) => {
            state
                .logger
                .error(&format!("Cannot refresh tracks: {}", e));
            let body = (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "tracks": [] })),
            );
            session.commit(&state, body.into_response()).await
        }
    }
}
