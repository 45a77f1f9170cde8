use std::{cmp::Reverse, collections::HashSet, fmt, str::FromStr};

use rand::{Rng, distr::Alphanumeric};

use crate::types::{Artist, Track};

/// Generates a random alphanumeric string of `len` characters.
///
/// Used for session ids and the OAuth `state` parameter.
pub fn generate_random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSort {
    NameAsc,
    NameDesc,
    ArtistAsc,
    ArtistDesc,
}

impl TrackSort {
    pub const ALL: [TrackSort; 4] = [
        TrackSort::NameAsc,
        TrackSort::NameDesc,
        TrackSort::ArtistAsc,
        TrackSort::ArtistDesc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TrackSort::NameAsc => "Name A-Z",
            TrackSort::NameDesc => "Name Z-A",
            TrackSort::ArtistAsc => "Artist A-Z",
            TrackSort::ArtistDesc => "Artist Z-A",
        }
    }
}

impl fmt::Display for TrackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackSort::NameAsc => "name_asc",
            TrackSort::NameDesc => "name_desc",
            TrackSort::ArtistAsc => "artist_asc",
            TrackSort::ArtistDesc => "artist_desc",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TrackSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name_asc" => Ok(TrackSort::NameAsc),
            "name_desc" => Ok(TrackSort::NameDesc),
            "artist_asc" => Ok(TrackSort::ArtistAsc),
            "artist_desc" => Ok(TrackSort::ArtistDesc),
            other => Err(format!("unknown sort option '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistSort {
    NameAsc,
    NameDesc,
}

impl ArtistSort {
    pub const ALL: [ArtistSort; 2] = [ArtistSort::NameAsc, ArtistSort::NameDesc];

    pub fn label(self) -> &'static str {
        match self {
            ArtistSort::NameAsc => "Name A-Z",
            ArtistSort::NameDesc => "Name Z-A",
        }
    }
}

impl fmt::Display for ArtistSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtistSort::NameAsc => "name_asc",
            ArtistSort::NameDesc => "name_desc",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ArtistSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name_asc" => Ok(ArtistSort::NameAsc),
            "name_desc" => Ok(ArtistSort::NameDesc),
            other => Err(format!("unknown sort option '{}'", other)),
        }
    }
}

/// Case-insensitive sort; ties keep their current relative order.
pub fn sort_tracks(tracks: &mut [Track], sort: TrackSort) {
    match sort {
        TrackSort::NameAsc => tracks.sort_by_cached_key(|t| t.name.to_lowercase()),
        TrackSort::NameDesc => tracks.sort_by_cached_key(|t| Reverse(t.name.to_lowercase())),
        TrackSort::ArtistAsc => tracks.sort_by_cached_key(|t| t.artist.to_lowercase()),
        TrackSort::ArtistDesc => tracks.sort_by_cached_key(|t| Reverse(t.artist.to_lowercase())),
    }
}

pub fn sort_artists(artists: &mut [Artist], sort: ArtistSort) {
    match sort {
        ArtistSort::NameAsc => artists.sort_by_cached_key(|a| a.name.to_lowercase()),
        ArtistSort::NameDesc => artists.sort_by_cached_key(|a| Reverse(a.name.to_lowercase())),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Keeps tracks whose name contains `search` and whose artist contains
/// `artist`, both case-insensitively. Blank filters are ignored.
pub fn filter_tracks(tracks: Vec<Track>, search: Option<&str>, artist: Option<&str>) -> Vec<Track> {
    let search = non_blank(search);
    let artist = non_blank(artist);

    tracks
        .into_iter()
        .filter(|t| search.is_none_or(|s| contains_ignore_case(&t.name, s)))
        .filter(|t| artist.is_none_or(|a| contains_ignore_case(&t.artist, a)))
        .collect()
}

pub fn filter_artists(artists: Vec<Artist>, name: Option<&str>) -> Vec<Artist> {
    let name = non_blank(name);
    artists
        .into_iter()
        .filter(|a| name.is_none_or(|n| contains_ignore_case(&a.name, n)))
        .collect()
}

/// Remote/in-memory offset of a 1-based page. Pages below 1 count as 1.
///
/// Saturates instead of wrapping, so a huge page lands past the end.
pub fn page_offset(page: u32, limit: u32) -> u32 {
    (page.max(1) - 1).saturating_mul(limit)
}

/// Number of pages needed for `total` items; never less than 1.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 1;
    }
    (total.div_ceil(limit as u64) as u32).max(1)
}

/// Items of the 1-based `page`; empty when the page lies past the end.
pub fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> Vec<T> {
    let start = page_offset(page, limit) as usize;
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(limit as usize).min(items.len());
    items[start..end].to_vec()
}

/// Drops repeated ids, keeping the first occurrence of each.
pub fn remove_duplicate_ids(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Splits a comma separated list of names, trimming blanks away.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
