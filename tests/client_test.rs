mod common;

use common::{Harness, artist, fresh_token, now, playlist, track};
use likedeck::{
    error::ServiceError,
    logger::Level,
    spotify::{ADD_ITEMS_CHUNK, REMOVE_CHUNK},
    types::{Token, TokenResponse, TrackObject},
};

fn top_tracks(prefix: &str, artist_name: &str, count: usize) -> Vec<TrackObject> {
    (1..=count)
        .map(|n| track(&format!("{}{}", prefix, n), &format!("{} song {}", artist_name, n), artist_name))
        .collect()
}

fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_create_playlist_unions_top_tracks() {
    let h = Harness::new();
    h.api.add_artist("queen", "Queen", top_tracks("q", "Queen", 5));
    h.api.add_artist("daft", "Daft Punk", top_tracks("d", "Daft Punk", 5));

    let playlist = h
        .client()
        .create_playlist("Mix", &names(&["Queen", "Daft Punk"]))
        .await
        .unwrap();

    assert_eq!(playlist.name, "Mix");
    assert_eq!(playlist.item_count, 10);

    let (created, added) = h.api.with(|s| (s.created_playlists.clone(), s.added_items.clone()));
    assert_eq!(created, vec![("user-1".to_string(), "Mix".to_string())]);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].0, playlist.id);
    assert_eq!(added[0].1.len(), 10);
    assert!(added[0].1.contains(&"spotify:track:q1".to_string()));
    assert!(added[0].1.contains(&"spotify:track:d5".to_string()));
}

#[tokio::test]
async fn test_create_playlist_drops_shared_tracks() {
    let h = Harness::new();
    let mut shared = top_tracks("a", "Artist A", 3);
    h.api.add_artist("a", "Artist A", shared.clone());
    shared.truncate(2);
    shared.push(track("b1", "Own song", "Artist B"));
    h.api.add_artist("b", "Artist B", shared);

    let playlist = h
        .client()
        .create_playlist("Overlap", &names(&["Artist A", "Artist B"]))
        .await
        .unwrap();

    assert_eq!(playlist.item_count, 4);
}

#[tokio::test]
async fn test_create_playlist_skips_unknown_artist() {
    let h = Harness::new();
    h.api.add_artist("queen", "Queen", top_tracks("q", "Queen", 5));

    let playlist = h
        .client()
        .create_playlist("Mix", &names(&["Queen", "Nobody Knows"]))
        .await
        .unwrap();

    assert_eq!(playlist.item_count, 5);
    let warnings = h.logger.at(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Nobody Knows"));
}

#[tokio::test]
async fn test_create_playlist_without_matches_creates_nothing() {
    let h = Harness::new();

    let err = h
        .client()
        .create_playlist("Mix", &names(&["Nobody", "Neither"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::EmptyResult(_)));
    assert!(h.api.with(|s| s.created_playlists.is_empty()));
    assert!(!h.api.calls().contains(&"create_playlist"));
}

#[tokio::test]
async fn test_create_playlist_validates_before_remote_calls() {
    let h = Harness::new();

    let err = h
        .client()
        .create_playlist("  ", &names(&["Queen"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = h
        .client()
        .create_playlist("Mix", &names(&[" ", ""]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_create_playlist_adds_items_in_chunks() {
    let h = Harness::new();
    let many = top_tracks("t", "Prolific", ADD_ITEMS_CHUNK + 30);
    h.api.add_artist("p", "Prolific", many);

    let playlist = h
        .client()
        .create_playlist("Big", &names(&["Prolific"]))
        .await
        .unwrap();

    assert_eq!(playlist.item_count, (ADD_ITEMS_CHUNK + 30) as u64);
    let sizes: Vec<usize> = h.api.with(|s| s.added_items.iter().map(|(_, u)| u.len()).collect());
    assert_eq!(sizes, vec![ADD_ITEMS_CHUNK, 30]);
}

#[tokio::test]
async fn test_operations_require_a_token() {
    let h = Harness::new();
    let client = h.anonymous_client();

    assert!(matches!(
        client.current_user().await,
        Err(ServiceError::NotAuthenticated)
    ));
    assert!(matches!(
        client.create_playlist("Mix", &names(&["Queen"])).await,
        Err(ServiceError::NotAuthenticated)
    ));
    assert!(matches!(
        client.list_liked_tracks(20, 0).await,
        Err(ServiceError::NotAuthenticated)
    ));
    assert!(matches!(
        client.remove_playlist("pl-1").await,
        Err(ServiceError::NotAuthenticated)
    ));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_exchange_code_binds_token() {
    let h = Harness::new();
    h.api.with(|s| {
        s.token_response = Some(TokenResponse {
            access_token: "fresh-access".to_string(),
            refresh_token: Some("fresh-refresh".to_string()),
            expires_in: 3600,
            scope: None,
        })
    });

    let mut client = h.anonymous_client();
    let token = client.exchange_code(" the-code ").await.unwrap();

    assert_eq!(token.access_token, "fresh-access");
    assert!(!token.is_expired(now()));
    assert_eq!(client.token(), Some(&token));
    assert_eq!(h.api.with(|s| s.exchanged_codes.clone()), vec!["the-code"]);

    client.current_user().await.unwrap();
    assert_eq!(h.api.with(|s| s.access_tokens_seen.clone()), vec!["fresh-access"]);
}

#[tokio::test]
async fn test_exchange_code_with_oversized_lifetime() {
    let h = Harness::new();
    h.api.with(|s| {
        s.token_response = Some(TokenResponse {
            access_token: "forever".to_string(),
            refresh_token: None,
            expires_in: u64::MAX,
            scope: None,
        })
    });

    let mut client = h.anonymous_client();
    let token = client.exchange_code("the-code").await.unwrap();

    assert_eq!(token.expires_at, u64::MAX);
    assert!(!token.is_expired(now()));
    assert!(token.is_expired(u64::MAX));

    let late = Token::from_response(
        TokenResponse {
            access_token: "late".to_string(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        },
        u64::MAX - 10,
    );
    assert_eq!(late.expires_at, u64::MAX);
}

#[tokio::test]
async fn test_exchange_code_rejects_blank_code() {
    let h = Harness::new();
    let mut client = h.anonymous_client();

    let err = client.exchange_code("").await.unwrap_err();
    assert!(matches!(err, ServiceError::Auth(_)));
    assert!(client.token().is_none());
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token() {
    let h = Harness::new();
    h.api.with(|s| {
        s.refresh_response = Some(TokenResponse {
            access_token: "access-2".to_string(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        })
    });
    let stale = Token {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: now() + 60,
    };

    let mut client =
        likedeck::spotify::SpotifyClient::with_token(h.api.clone(), h.logger.clone(), stale);
    assert!(client.refresh_if_expired(now()).await.unwrap());

    let token = client.token().unwrap();
    assert_eq!(token.access_token, "access-2");
    assert_eq!(token.refresh_token, "refresh-1");
    assert!(!token.is_expired(now()));
}

#[tokio::test]
async fn test_refresh_skips_valid_token() {
    let h = Harness::new();
    let mut client = h.client();

    assert!(!client.refresh_if_expired(now()).await.unwrap());
    assert_eq!(
        client.token().map(|t| t.access_token.clone()),
        Some(fresh_token().access_token)
    );
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_unfollow_artists_empty_is_validation_without_remote_call() {
    let h = Harness::new();

    let err = h.client().unfollow_artists(&[]).await.unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_unfollow_artists_in_chunks() {
    let h = Harness::new();
    let ids: Vec<String> = (0..REMOVE_CHUNK + 5).map(|n| format!("ar{}", n)).collect();
    h.api.with(|s| {
        s.followed = ids.iter().map(|id| artist(id, id)).collect();
    });

    h.client().unfollow_artists(&ids).await.unwrap();

    let (batches, left) = h.api.with(|s| (s.unfollowed_artists.clone(), s.followed.len()));
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), REMOVE_CHUNK);
    assert_eq!(batches[1].len(), 5);
    assert_eq!(left, 0);
}

#[tokio::test]
async fn test_remove_liked_tracks_by_id_removes_exactly_those() {
    let h = Harness::new();
    h.api.with(|s| {
        s.saved = vec![
            track("t1", "One", "A"),
            track("t2", "Two", "B"),
            track("t3", "Three", "C"),
        ];
    });

    let removed = h
        .client()
        .remove_liked_tracks(Some(&names(&["t1", "t3", "t1"])), None)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    let (batches, left) = h.api.with(|s| (s.removed_saved.clone(), s.saved.clone()));
    assert_eq!(batches, vec![vec!["t1".to_string(), "t3".to_string()]]);
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id.as_deref(), Some("t2"));
}

#[tokio::test]
async fn test_remove_liked_tracks_by_artist_name() {
    let h = Harness::new();
    h.api.with(|s| {
        s.tracks_by_artist
            .insert("queen".to_string(), top_tracks("q", "Queen", 3));
    });

    let removed = h
        .client()
        .remove_liked_tracks(None, Some(&names(&["Queen", "Nobody"])))
        .await
        .unwrap();

    assert_eq!(removed, 3);
    assert_eq!(h.api.with(|s| s.removed_saved.concat()), names(&["q1", "q2", "q3"]));
    assert_eq!(h.logger.at(Level::Warn).len(), 1);
}

#[tokio::test]
async fn test_remove_liked_tracks_rejects_both_selectors() {
    let h = Harness::new();

    let err = h
        .client()
        .remove_liked_tracks(Some(&names(&["t1"])), Some(&names(&["Queen"])))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = h
        .client()
        .remove_liked_tracks(Some(&names(&[" "])), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_remove_liked_tracks_without_selector_clears_first_page() {
    let h = Harness::new();
    h.api.with(|s| {
        s.saved = (0..60)
            .map(|n| track(&format!("t{}", n), "Song", "Artist"))
            .collect();
    });

    let removed = h.client().remove_liked_tracks(None, None).await.unwrap();

    assert_eq!(removed, 50);
    assert_eq!(h.api.with(|s| s.saved.len()), 10);
}

#[tokio::test]
async fn test_list_liked_tracks_projects_first_artist() {
    let h = Harness::new();
    let mut duet = track("t1", "Duet", "Singer");
    duet.artists.push(likedeck::types::SimpleArtistObject {
        id: Some("guest".to_string()),
        name: "Guest".to_string(),
    });
    let local = TrackObject {
        id: None,
        name: "Local file".to_string(),
        artists: Vec::new(),
    };
    h.api.with(|s| s.saved = vec![duet, local, track("t2", "Solo", "Other")]);

    let tracks = h.client().list_liked_tracks(20, 0).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].artist, "Singer");
    assert_eq!(tracks[1].id, "t2");
}

#[tokio::test]
async fn test_list_liked_tracks_empty_library() {
    let h = Harness::new();

    let err = h.client().list_liked_tracks(20, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmptyResult(_)));
    assert_eq!(h.client().liked_tracks_total().await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_liked_artists_deduplicates_in_first_seen_order() {
    let h = Harness::new();
    h.api.with(|s| {
        s.saved = vec![
            track("t1", "One", "Queen"),
            track("t2", "Two", "Daft Punk"),
            track("t3", "Three", "Queen"),
        ];
    });

    let artists = h.client().list_liked_artists(50, 0).await.unwrap();

    let names: Vec<&str> = artists.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Queen", "Daft Punk"]);
}

#[tokio::test]
async fn test_list_followed_artists_follows_cursor() {
    let h = Harness::new();
    h.api.with(|s| {
        s.followed = (0..5)
            .map(|n| artist(&format!("ar{}", n), &format!("Artist {}", n)))
            .collect();
    });
    let client = h.client();

    let (first, next) = client.list_followed_artists(3, None).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(next.as_deref(), Some("ar2"));

    let (second, next) = client.list_followed_artists(3, Some("ar2")).await.unwrap();
    let ids: Vec<&str> = second.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["ar3", "ar4"]);
    assert!(next.is_none());
}

#[tokio::test]
async fn test_user_playlists_and_remove() {
    let h = Harness::new();
    h.api.with(|s| {
        s.playlists = vec![
            playlist("p1", "Road trip", 12),
            playlist("p2", "Focus", 40),
        ];
    });
    let client = h.client();

    let page = client.user_playlists_page(10, 0).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[1].item_count, 40);
    assert_eq!(client.user_playlist_total().await.unwrap(), 2);

    client.remove_playlist("p1").await.unwrap();
    let remaining = client.list_user_playlists(10, 0).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "p2");

    let err = client.remove_playlist(" ").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_remote_failure_is_propagated() {
    let h = Harness::new();
    h.api.with(|s| {
        s.failing.insert("saved_tracks");
        s.unauthorized.insert("current_user");
    });
    let client = h.client();

    assert!(matches!(
        client.list_liked_tracks(20, 0).await,
        Err(ServiceError::Remote(_))
    ));
    assert!(matches!(
        client.current_user().await,
        Err(ServiceError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_limits_are_clamped() {
    let h = Harness::new();
    h.api.with(|s| {
        s.saved = (0..80)
            .map(|n| track(&format!("t{}", n), "Song", "Artist"))
            .collect();
    });

    let page = h.client().liked_tracks_page(500, 0).await.unwrap();
    assert_eq!(page.items.len(), 50);
    assert_eq!(page.total, 80);
}
