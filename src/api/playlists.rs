use axum::{
    Form,
    extract::{Path, State},
    response::{Redirect, Response},
};

use crate::{server::AppState, session::FlashLevel, utils, views};

use super::{Session, fail, form_value, session_client};

pub const PLAYLISTS_PER_PAGE: u32 = 10;

pub async fn create_playlist_form(State(state): State<AppState>, mut session: Session) -> Response {
    if session.data.token.is_none() {
        return session.commit(&state, Redirect::to("/login")).await;
    }
    let flashes = session.data.take_flashes();
    session
        .commit(&state, views::create_playlist(&flashes))
        .await
}

/// Form fields: `playlist_name`, `artist_names` (comma separated).
pub async fn create_playlist(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot create playlist", "/create_playlist").await,
    };

    let name = form_value(&form, "playlist_name").unwrap_or_default();
    let artist_names = form_value(&form, "artist_names")
        .map(|raw| utils::split_names(&raw))
        .unwrap_or_default();

    match client.create_playlist(&name, &artist_names).await {
        Ok(playlist) => {
            session.flash(
                FlashLevel::Success,
                format!(
                    "Playlist \"{}\" created with {} tracks!",
                    playlist.name, playlist.item_count
                ),
            );
            session
                .commit(&state, Redirect::to("/create_playlist"))
                .await
        }
        Err(e) => fail(&state, session, e, "Cannot create playlist", "/create_playlist").await,
    }
}

pub async fn view_playlists(
    State(state): State<AppState>,
    mut session: Session,
    page: Option<Path<u32>>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot list playlists", "/dashboard").await,
    };

    let page = page.map(|Path(p)| p).unwrap_or(1).max(1);
    let offset = utils::page_offset(page, PLAYLISTS_PER_PAGE);

    match client.user_playlists_page(PLAYLISTS_PER_PAGE, offset).await {
        Ok(result) => {
            let view = views::PlaylistsView {
                playlists: result.items,
                page,
                total_pages: utils::total_pages(result.total, PLAYLISTS_PER_PAGE),
            };
            let flashes = session.data.take_flashes();
            session
                .commit(&state, views::playlists(&flashes, &view))
                .await
        }
        Err(e) => fail(&state, session, e, "Cannot list playlists", "/dashboard").await,
    }
}

pub async fn remove_playlist(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<String>,
) -> Response {
    let client = match session_client(&state, &mut session).await {
        Ok(client) => client,
        Err(e) => return fail(&state, session, e, "Cannot remove playlist", "/view_playlists").await,
    };

    match client.remove_playlist(&id).await {
        Ok(()) => {
            session.flash(FlashLevel::Success, "Playlist removed successfully!");
            session
                .commit(&state, Redirect::to("/view_playlists"))
                .await
        }
        Err(e) => fail(&state, session, e, "Cannot remove playlist", "/view_playlists").await,
    }
}
