use songport_core::MediaKind;

use crate::api::itunes::ItunesItem;
use crate::api::spotify::SpotifyItem;

/// The names resolved on the Apple side that feed the Spotify search query.
/// For episodes `item_name` may be absent when recovery degraded to
/// show-only metadata.
#[derive(Debug, Clone, Default)]
pub struct NameBag {
    pub item_name: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
}

impl NameBag {
    pub fn from_itunes(item: &ItunesItem) -> Self {
        Self {
            item_name: item.track_name.clone(),
            artist_name: item.artist_name.clone(),
            collection_name: item.collection_name.clone(),
        }
    }
}

/// Search term for the Apple catalog: a type-specific concatenation of the
/// source item's names.
pub fn itunes_term(item: &SpotifyItem) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(name) = item.name() {
        parts.push(name);
    }
    let artist = item.artist();
    let collection = item.collection();
    match item {
        SpotifyItem::Track(_) => {
            if let Some(artist) = artist.as_deref() {
                parts.push(artist);
            }
            if let Some(collection) = collection.as_deref() {
                parts.push(collection);
            }
        }
        SpotifyItem::Album(_) => {
            if let Some(artist) = artist.as_deref() {
                parts.push(artist);
            }
        }
        SpotifyItem::Artist(_) | SpotifyItem::Show(_) => {}
        SpotifyItem::Episode(_) => {
            if let Some(collection) = collection.as_deref() {
                parts.push(collection);
            }
        }
    }
    parts.join(" ")
}

/// Search query for the Spotify catalog, built from whatever names were
/// resolved on the Apple side. Quote and colon characters would be parsed as
/// query syntax over there, so they are stripped.
pub fn spotify_query(names: &NameBag, kind: MediaKind) -> String {
    let item = names.item_name.as_deref();
    let artist = names.artist_name.as_deref();
    let collection = names.collection_name.as_deref();
    let parts: Vec<&str> = match kind {
        MediaKind::Track => [item, artist, collection].into_iter().flatten().collect(),
        MediaKind::Album => [collection, artist].into_iter().flatten().collect(),
        MediaKind::Artist => artist.into_iter().collect(),
        MediaKind::Show => [collection, artist].into_iter().flatten().collect(),
        // Episode name when recovery found one, show-only otherwise.
        MediaKind::Episode => match item {
            Some(name) => [Some(name), collection].into_iter().flatten().collect(),
            None => [collection, artist].into_iter().flatten().collect(),
        },
    };
    parts
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ':'))
        .collect()
}

/// Entity and media parameters for searching the Apple catalog.
pub fn itunes_entity_media(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Track => ("song", "music"),
        MediaKind::Album => ("album", "music"),
        MediaKind::Artist => ("musicArtist", "music"),
        MediaKind::Show => ("podcast", "podcast"),
        MediaKind::Episode => ("podcastEpisode", "podcast"),
    }
}

/// Scans the Apple results in order and accepts the first row whose returned
/// kind/wrapper strictly matches the requested type. No fuzzy scoring and no
/// fallback to an off-type row.
pub fn pick_itunes_candidate(results: &[ItunesItem], kind: MediaKind) -> Option<&ItunesItem> {
    results.iter().find(|row| {
        let row_kind = row.kind.as_deref();
        let wrapper = row.wrapper_type.as_deref();
        match kind {
            MediaKind::Track => row_kind == Some("song"),
            MediaKind::Album => {
                wrapper == Some("collection") && row.collection_type.as_deref() == Some("Album")
            }
            MediaKind::Artist => {
                wrapper == Some("artist") && row.artist_type.as_deref() == Some("MusicArtist")
            }
            MediaKind::Show => row_kind == Some("podcast"),
            MediaKind::Episode => row_kind == Some("podcast-episode"),
        }
    })
}

/// The matched row's public URL, by the field the requested kind lives in.
pub fn apple_url(item: &ItunesItem, kind: MediaKind) -> Option<String> {
    match kind {
        MediaKind::Track | MediaKind::Episode => item.track_view_url.clone(),
        MediaKind::Album => item.collection_view_url.clone(),
        MediaKind::Artist => item.artist_view_url.clone(),
        MediaKind::Show => item.collection_view_url.clone().or_else(|| item.feed_url.clone()),
    }
}

pub fn spotify_url(kind: MediaKind, id: &str) -> String {
    format!("https://open.spotify.com/{}/{id}", kind.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use songport_core::MediaKind;

    use super::{
        NameBag, apple_url, itunes_entity_media, itunes_term, pick_itunes_candidate, spotify_query,
        spotify_url,
    };
    use crate::api::itunes::ItunesItem;
    use crate::api::spotify::SpotifyItem;

    fn track_item() -> SpotifyItem {
        SpotifyItem::Track(
            serde_json::from_value(json!({
                "name": "Yellow",
                "artists": [{ "name": "Coldplay" }],
                "album": { "name": "Parachutes" }
            }))
            .unwrap(),
        )
    }

    fn itunes_row(value: serde_json::Value) -> ItunesItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn track_term_concatenates_name_artists_album() {
        assert_eq!(itunes_term(&track_item()), "Yellow Coldplay Parachutes");
    }

    #[test]
    fn artist_term_is_the_name_alone() {
        let artist = SpotifyItem::Artist(serde_json::from_value(json!({ "name": "Coldplay" })).unwrap());
        assert_eq!(itunes_term(&artist), "Coldplay");
    }

    #[test]
    fn episode_term_includes_the_show_name() {
        let episode = SpotifyItem::Episode(
            serde_json::from_value(json!({
                "name": "Part One",
                "show": { "name": "The Daily", "publisher": "NYT" }
            }))
            .unwrap(),
        );
        assert_eq!(itunes_term(&episode), "Part One The Daily");
    }

    #[test]
    fn spotify_query_strips_quotes_and_colons() {
        let names = NameBag {
            item_name: Some("Don't Stop: Part \"Two\"".to_string()),
            artist_name: Some("Artist".to_string()),
            collection_name: Some("Album".to_string()),
        };
        let query = spotify_query(&names, MediaKind::Track);
        assert_eq!(query, "Dont Stop Part Two Artist Album");
    }

    #[test]
    fn episode_query_degrades_to_show_metadata() {
        let names = NameBag {
            item_name: None,
            artist_name: Some("NYT".to_string()),
            collection_name: Some("The Daily".to_string()),
        };
        assert_eq!(spotify_query(&names, MediaKind::Episode), "The Daily NYT");

        let with_name = NameBag {
            item_name: Some("Part One".to_string()),
            ..names
        };
        assert_eq!(spotify_query(&with_name, MediaKind::Episode), "Part One The Daily");
    }

    #[test]
    fn entity_media_pairs_cover_both_media_types() {
        assert_eq!(itunes_entity_media(MediaKind::Track), ("song", "music"));
        assert_eq!(itunes_entity_media(MediaKind::Show), ("podcast", "podcast"));
    }

    #[test]
    fn candidate_scan_skips_off_type_rows() {
        let results = vec![
            itunes_row(json!({ "kind": "podcast", "collectionName": "Wrong" })),
            itunes_row(json!({ "kind": "song", "trackName": "Yellow" })),
        ];
        let candidate = pick_itunes_candidate(&results, MediaKind::Track).unwrap();
        assert_eq!(candidate.track_name.as_deref(), Some("Yellow"));
    }

    #[test]
    fn candidate_scan_requires_album_wrapper_and_type() {
        let results = vec![
            itunes_row(json!({ "wrapperType": "collection", "collectionType": "Compilation" })),
            itunes_row(json!({ "wrapperType": "collection", "collectionType": "Album" })),
        ];
        let candidate = pick_itunes_candidate(&results, MediaKind::Album).unwrap();
        assert_eq!(candidate.collection_type.as_deref(), Some("Album"));
    }

    #[test]
    fn no_strict_match_yields_none() {
        let results = vec![itunes_row(json!({ "kind": "podcast" }))];
        assert!(pick_itunes_candidate(&results, MediaKind::Track).is_none());
        assert!(pick_itunes_candidate(&[], MediaKind::Track).is_none());
    }

    #[test]
    fn apple_url_picks_the_kind_field() {
        let row = itunes_row(json!({
            "trackViewUrl": "https://music.apple.com/us/album/yellow/1122782283?i=1122782511",
            "collectionViewUrl": "https://music.apple.com/us/album/parachutes/1122782283",
            "feedUrl": "https://feeds.example.com/show.xml"
        }));
        assert_eq!(
            apple_url(&row, MediaKind::Track).unwrap(),
            "https://music.apple.com/us/album/yellow/1122782283?i=1122782511"
        );
        assert_eq!(
            apple_url(&row, MediaKind::Album).unwrap(),
            "https://music.apple.com/us/album/parachutes/1122782283"
        );
    }

    #[test]
    fn show_url_falls_back_to_the_feed() {
        let row = itunes_row(json!({ "feedUrl": "https://feeds.example.com/show.xml" }));
        assert_eq!(
            apple_url(&row, MediaKind::Show).unwrap(),
            "https://feeds.example.com/show.xml"
        );
    }

    #[test]
    fn built_apple_urls_reparse_to_the_same_kind() {
        let track_url = "https://music.apple.com/us/album/yellow/1122782283?i=1122782511";
        let parsed = songport_links::parse(track_url).unwrap();
        assert_eq!(parsed.kind, MediaKind::Track);
        assert_eq!(parsed.id, "1122782511");

        let show_url = "https://podcasts.apple.com/us/podcast/the-daily/id1200361736";
        let parsed = songport_links::parse(show_url).unwrap();
        assert_eq!(parsed.kind, MediaKind::Show);
    }

    #[test]
    fn built_spotify_urls_reparse_to_the_same_kind() {
        for kind in [
            MediaKind::Track,
            MediaKind::Album,
            MediaKind::Artist,
            MediaKind::Show,
            MediaKind::Episode,
        ] {
            let url = spotify_url(kind, "4Km5HrUvYTaSUfiSGPJeQR");
            let parsed = songport_links::parse(&url).unwrap();
            assert_eq!(parsed.kind, kind);
            assert_eq!(parsed.id, "4Km5HrUvYTaSUfiSGPJeQR");
        }
    }
}
