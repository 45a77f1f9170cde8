//! HTML pages.
//!
//! Handlers build one of the view models below and hand it to the matching
//! render function. Markup is intentionally plain; styling is left to whoever
//! deploys the application.

use std::fmt::Write;

use axum::response::Html;
use serde::Serialize;

use crate::{
    session::{Flash, FlashLevel},
    types::{Artist, Playlist, Track},
    utils::{ArtistSort, TrackSort},
};

pub const DEFAULT_USER_IMAGE: &str = "https://example.com/default-image.png";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub user_name: String,
    pub user_image: String,
    pub top_artists: Vec<Artist>,
    pub recent_tracks: Vec<Track>,
    pub liked_track_count: Option<u64>,
    pub playlist_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistsView {
    pub playlists: Vec<Playlist>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedTracksView {
    pub tracks: Vec<Track>,
    pub page: u32,
    pub total_pages: u32,
    pub sort: Option<String>,
    pub artist: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksView {
    pub tracks: Vec<Track>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedArtistsView {
    pub artists: Vec<Artist>,
    pub page: u32,
    pub total_pages: u32,
    pub sort: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowedArtistsView {
    pub artists: Vec<Artist>,
    pub next: Option<String>,
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], signed_in: bool, body: &str) -> Html<String> {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{} - likedeck</title></head><body>",
        escape(title)
    );
    if signed_in {
        page.push_str(
            "<nav><a href=\"/dashboard\">Dashboard</a> | <a href=\"/create_playlist\">New playlist</a> | \
<a href=\"/view_playlists\">Playlists</a> | <a href=\"/liked_tracks\">Liked tracks</a> | \
<a href=\"/liked_artists\">Liked artists</a> | <a href=\"/followed_artists\">Followed artists</a> | \
<form method=\"post\" action=\"/logout\" style=\"display:inline\"><button>Log out</button></form></nav>",
        );
    }
    for flash in flashes {
        let class = match flash.level {
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        };
        let _ = write!(
            page,
            "<p class=\"flash {}\">{}</p>",
            class,
            escape(&flash.message)
        );
    }
    let _ = write!(page, "<main><h1>{}</h1>{}</main></body></html>", escape(title), body);
    Html(page)
}

fn pager(base: &str, page: u32, total_pages: u32, query: &str) -> String {
    let mut out = String::from("<p class=\"pager\">");
    if page > 1 {
        let _ = write!(out, "<a href=\"{}/{}{}\">Previous</a> ", base, page - 1, query);
    }
    let _ = write!(out, "Page {} of {}", page, total_pages);
    if page < total_pages {
        let _ = write!(out, " <a href=\"{}/{}{}\">Next</a>", base, page + 1, query);
    }
    out.push_str("</p>");
    out
}

fn browse_query(pairs: &[(&str, &Option<String>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, escape(&encode_component(v))))
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&amp;"))
    }
}

fn encode_component(raw: &str) -> String {
    let mut out = String::new();
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}

pub fn home(flashes: &[Flash]) -> Html<String> {
    layout(
        "Welcome",
        flashes,
        false,
        "<p>Manage your Spotify playlists, liked tracks and artists.</p>\
<p><a href=\"/login\">Log in with Spotify</a></p>",
    )
}

pub fn dashboard(flashes: &[Flash], view: &DashboardView) -> Html<String> {
    let mut body = String::new();
    let _ = write!(
        body,
        "<p><img src=\"{}\" alt=\"\" width=\"64\" height=\"64\"> Hello, {}!</p>",
        escape(&view.user_image),
        escape(&view.user_name)
    );
    if let Some(count) = view.liked_track_count {
        let _ = write!(body, "<p>Liked tracks: {}</p>", count);
    }
    if let Some(count) = view.playlist_count {
        let _ = write!(body, "<p>Playlists: {}</p>", count);
    }
    body.push_str("<h2>Your top artists</h2><ul>");
    for artist in &view.top_artists {
        let _ = write!(body, "<li>{}</li>", escape(&artist.name));
    }
    body.push_str("</ul><h2>Recently played</h2><ul>");
    for track in &view.recent_tracks {
        let _ = write!(
            body,
            "<li>{} - {}</li>",
            escape(&track.name),
            escape(&track.artist)
        );
    }
    body.push_str("</ul>");
    layout("Dashboard", flashes, true, &body)
}

pub fn create_playlist(flashes: &[Flash]) -> Html<String> {
    layout(
        "Create a playlist",
        flashes,
        true,
        "<form method=\"post\" action=\"/create_playlist\">\
<label>Playlist name <input name=\"playlist_name\" required></label>\
<label>Artists (comma separated) <input name=\"artist_names\" required></label>\
<button>Create</button></form>",
    )
}

pub fn playlists(flashes: &[Flash], view: &PlaylistsView) -> Html<String> {
    let mut body = String::from("<ul>");
    for playlist in &view.playlists {
        let _ = write!(
            body,
            "<li>{} ({} tracks) <form method=\"post\" action=\"/remove_playlist/{}\" style=\"display:inline\">\
<button>Remove</button></form></li>",
            escape(&playlist.name),
            playlist.item_count,
            escape(&encode_component(&playlist.id))
        );
    }
    body.push_str("</ul>");
    body.push_str(&pager("/view_playlists", view.page, view.total_pages, ""));
    layout("Your playlists", flashes, true, &body)
}

/// Sort dropdown; the current choice stays selected.
fn sort_select(body: &mut String, options: &[(String, &str)], current: Option<&str>) {
    body.push_str("<select name=\"sort\"><option value=\"\">Library order</option>");
    for (value, label) in options {
        let selected = if current == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            "<option value=\"{}\"{}>{}</option>",
            value, selected, label
        );
    }
    body.push_str("</select>");
}

fn track_checklist(body: &mut String, tracks: &[Track]) {
    body.push_str("<ul>");
    for track in tracks {
        let _ = write!(
            body,
            "<li><label><input type=\"checkbox\" name=\"track_ids\" value=\"{}\"> {} - {}</label></li>",
            escape(&track.id),
            escape(&track.name),
            escape(&track.artist)
        );
    }
    body.push_str("</ul>");
}

pub fn liked_tracks(flashes: &[Flash], view: &LikedTracksView) -> Html<String> {
    let mut body = String::from(
        "<form method=\"get\"><input name=\"search\" placeholder=\"Track\"> \
<input name=\"artist\" placeholder=\"Artist\"> ",
    );
    let options: Vec<(String, &str)> = TrackSort::ALL
        .iter()
        .map(|s| (s.to_string(), s.label()))
        .collect();
    sort_select(&mut body, &options, view.sort.as_deref());
    body.push_str(" <button>Apply</button></form>");
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/liked_tracks/{}\">",
        view.page
    );
    track_checklist(&mut body, &view.tracks);
    body.push_str("<button>Remove selected</button></form>");
    let query = browse_query(&[
        ("sort", &view.sort),
        ("artist", &view.artist),
        ("search", &view.search),
    ]);
    body.push_str(&pager("/liked_tracks", view.page, view.total_pages, &query));
    layout("Liked tracks", flashes, true, &body)
}

pub fn remove_tracks(flashes: &[Flash], view: &RemoveTracksView) -> Html<String> {
    let mut body = String::new();
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/remove_liked_tracks?page={}\">",
        view.page
    );
    track_checklist(&mut body, &view.tracks);
    body.push_str("<button>Remove selected</button></form>");
    body.push_str(
        "<form method=\"post\" action=\"/remove_tracks_by_artist\">\
<label>Remove every liked track of <input name=\"artist_name\" required></label>\
<button>Remove</button></form>",
    );
    body.push_str("<p class=\"pager\">");
    if view.page > 1 {
        let _ = write!(
            body,
            "<a href=\"/remove_liked_tracks?page={}\">Previous</a> ",
            view.page - 1
        );
    }
    let _ = write!(body, "Page {} of {}", view.page, view.total_pages);
    if view.page < view.total_pages {
        let _ = write!(
            body,
            " <a href=\"/remove_liked_tracks?page={}\">Next</a>",
            view.page + 1
        );
    }
    body.push_str("</p>");
    layout("Remove liked tracks", flashes, true, &body)
}

fn artist_checklist(body: &mut String, artists: &[Artist]) {
    body.push_str("<ul>");
    for artist in artists {
        let _ = write!(
            body,
            "<li><label><input type=\"checkbox\" name=\"artist_ids\" value=\"{}\"> {}</label></li>",
            escape(&artist.id),
            escape(&artist.name)
        );
    }
    body.push_str("</ul>");
}

pub fn liked_artists(flashes: &[Flash], view: &LikedArtistsView) -> Html<String> {
    let mut body = String::from("<form method=\"get\"><input name=\"artist\" placeholder=\"Artist\"> ");
    let options: Vec<(String, &str)> = ArtistSort::ALL
        .iter()
        .map(|s| (s.to_string(), s.label()))
        .collect();
    sort_select(&mut body, &options, view.sort.as_deref());
    body.push_str(" <button>Apply</button></form>");
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/liked_artists/{}\">",
        view.page
    );
    artist_checklist(&mut body, &view.artists);
    body.push_str("<button>Unfollow selected</button></form>");
    let query = browse_query(&[("sort", &view.sort), ("artist", &view.artist)]);
    body.push_str(&pager("/liked_artists", view.page, view.total_pages, &query));
    layout("Artists you liked", flashes, true, &body)
}

pub fn followed_artists(flashes: &[Flash], view: &FollowedArtistsView) -> Html<String> {
    let mut body = String::from("<form method=\"post\" action=\"/followed_artists\">");
    artist_checklist(&mut body, &view.artists);
    body.push_str("<button>Unfollow selected</button></form>");
    if let Some(next) = &view.next {
        let _ = write!(
            body,
            "<p class=\"pager\"><a href=\"/followed_artists?after={}\">Next</a></p>",
            escape(&encode_component(next))
        );
    }
    layout("Artists you follow", flashes, true, &body)
}
