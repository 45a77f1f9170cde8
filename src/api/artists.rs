use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Redirect, Response},
};
use serde::Deserialize;

use crate::{
    server::AppState,
    session::FlashLevel,
    spotify::MAX_PAGE_SIZE,
    utils::{self, ArtistSort},
    views,
};

use super::{BrowseQuery, Session, fail, form_values, session_client};

pub const ARTISTS_PER_PAGE: u32 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct CursorQuery {
    pub after: Option<String>,
}

/// Artists found on the liked tracks, with filter, sort and pagination.
pub async fn liked_artists(
    State(state): State<AppState>,
    mut session: Session,
    page: Option<Path<u32>>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot list liked artists", "/dashboard").await,
    };

    let page = page.map(|Path(p)| p).unwrap_or(1).max(1);

    let artists = match client.list_liked_artists(MAX_PAGE_SIZE, 0).await {
        Ok(artists) => artists,
        Err(e) => return fail(&state, session, e, "Cannot list liked artists", "/dashboard").await,
    };

    let mut artists = utils::filter_artists(artists, query.artist.as_deref());
    if let Some(sort) = query.sort.as_deref().and_then(|s| s.parse::<ArtistSort>().ok()) {
        utils::sort_artists(&mut artists, sort);
    }

    let view = views::LikedArtistsView {
        total_pages: utils::total_pages(artists.len() as u64, ARTISTS_PER_PAGE),
        artists: utils::paginate(&artists, page, ARTISTS_PER_PAGE),
        page,
        sort: query.sort,
        artist: query.artist,
    };

    let flashes = session.data.take_flashes();
    session
        .commit(&state, views::liked_artists(&flashes, &view))
        .await
}

pub async fn unfollow_selected_artists(
    State(state): State<AppState>,
    session: Session,
    page: Option<Path<u32>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let page = page.map(|Path(p)| p).unwrap_or(1).max(1);
    let back = format!("/liked_artists/{}", page);
    unfollow(state, session, form, &back).await
}

/// Artists the user follows, one cursor page at a time.
pub async fn followed_artists(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<CursorQuery>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot list followed artists", "/dashboard").await,
    };

    let after = query.after.as_deref().filter(|a| !a.is_empty());
    match client.list_followed_artists(ARTISTS_PER_PAGE, after).await {
        Ok((artists, next)) => {
            let view = views::FollowedArtistsView { artists, next };
            let flashes = session.data.take_flashes();
            session
                .commit(&state, views::followed_artists(&flashes, &view))
                .await
        }
        Err(e) => fail(&state, session, e, "Cannot list followed artists", "/dashboard").await,
    }
}

pub async fn unfollow_followed_artists(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    unfollow(state, session, form, "/followed_artists").await
}

async fn unfollow(
    state: AppState,
    mut session: Session,
    form: Vec<(String, String)>,
    back: &str,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot unfollow artists", back).await,
    };

    let ids = form_values(&form, "artist_ids");
    match client.unfollow_artists(&ids).await {
        Ok(()) => {
            session.flash(
                FlashLevel::Success,
                format!("{} artists unfollowed successfully!", ids.len()),
            );
            session.commit(&state, Redirect::to(back)).await
        }
        Err(e) => fail(&state, session, e, "Cannot unfollow artists", back).await,
    }
}
