use std::sync::Arc;

use reqwest::Client;
use songport_core::{
    Catalog, ConversionDetails, ConversionResult, ItemSummary, MediaKind, SongportError,
    SongportResult,
};
use songport_links::ParsedLink;
use tracing::{info, warn};

use crate::api::itunes::{ItunesClient, ItunesItem, SearchParams};
use crate::api::spotify::{SpotifyClient, SpotifyHit, SpotifyItem};
use crate::auth::{SpotifyCredentials, TokenProvider};
use crate::matcher::{self, NameBag};

const SEARCH_LIMIT: u32 = 5;
const EPISODE_SEARCH_LIMIT: u32 = 200;

/// Sequences parse result -> lookup -> match -> URL build for both
/// directions. Owns the HTTP clients; one instance serves all requests.
#[derive(Debug, Clone)]
pub struct Converter {
    spotify: SpotifyClient,
    itunes: ItunesClient,
    tokens: Arc<TokenProvider>,
}

impl Converter {
    pub fn new(credentials: Option<SpotifyCredentials>) -> Self {
        let client = Client::builder()
            .user_agent("songport/0.1")
            .build()
            .expect("failed to build http client");
        let tokens = Arc::new(TokenProvider::new(client.clone(), credentials));
        Self {
            spotify: SpotifyClient::new(client.clone(), tokens.clone()),
            itunes: ItunesClient::new(client),
            tokens,
        }
    }

    /// Fetches a token ahead of the first conversion; callers treat a failure
    /// as a warning since auth is retried lazily per request.
    pub async fn warm_token(&self) -> SongportResult<()> {
        self.tokens.bearer().await.map(|_| ())
    }

    pub async fn convert(
        &self,
        link: &ParsedLink,
        request_country: &str,
    ) -> SongportResult<ConversionResult> {
        match link.source {
            Catalog::Spotify => self.spotify_to_apple(link, request_country).await,
            Catalog::Apple => self.apple_to_spotify(link).await,
        }
    }

    async fn spotify_to_apple(
        &self,
        link: &ParsedLink,
        country: &str,
    ) -> SongportResult<ConversionResult> {
        let item = self.spotify.fetch_details(link.kind, &link.id).await?;
        let term = matcher::itunes_term(&item);
        let (entity, media) = matcher::itunes_entity_media(link.kind);
        let results = self
            .itunes
            .search(SearchParams {
                term: &term,
                country,
                media,
                entity,
                limit: SEARCH_LIMIT,
                collection_id: None,
            })
            .await?;
        let candidate = matcher::pick_itunes_candidate(&results, link.kind);
        match candidate {
            Some(row) => {
                let name = row
                    .track_name
                    .as_deref()
                    .or(row.collection_name.as_deref())
                    .or(row.artist_name.as_deref());
                info!(kind = %link.kind, ?name, "apple match found");
            }
            None => info!(kind = %link.kind, term = %term, "no strict apple match"),
        }
        Ok(assemble_apple_result(link, &item, candidate))
    }

    async fn apple_to_spotify(&self, link: &ParsedLink) -> SongportResult<ConversionResult> {
        let names = match (link.kind, link.show_id.as_deref()) {
            (MediaKind::Episode, Some(show_id)) => {
                self.resolve_episode_names(link, show_id).await?
            }
            (MediaKind::Episode, None) => {
                return Err(SongportError::NotFound(format!(
                    "parent show id for episode {}",
                    link.id
                )));
            }
            _ => {
                let item = self
                    .itunes
                    .lookup(link.kind, &link.id, &link.country)
                    .await?
                    .ok_or_else(|| {
                        SongportError::NotFound(format!("itunes {}/{}", link.kind, link.id))
                    })?;
                NameBag::from_itunes(&item)
            }
        };
        let query = matcher::spotify_query(&names, link.kind);
        let hit = self.spotify.search(&query, link.kind).await?;
        match &hit {
            Some(row) => info!(kind = %link.kind, name = ?row.name, "spotify match found"),
            None => info!(kind = %link.kind, query = %query, "no spotify match"),
        }
        Ok(assemble_spotify_result(link, &names, hit))
    }

    /// Two-step episode resolution: the show lookup supplies the show name
    /// and publisher, then a search constrained to the show's collection id
    /// recovers the episode's own name. A miss degrades to show-only
    /// metadata instead of failing.
    async fn resolve_episode_names(
        &self,
        link: &ParsedLink,
        show_id: &str,
    ) -> SongportResult<NameBag> {
        let show = self
            .itunes
            .lookup(MediaKind::Show, show_id, &link.country)
            .await?
            .ok_or_else(|| SongportError::NotFound(format!("itunes show/{show_id}")))?;
        let mut episode_name = None;
        if let Some(show_name) = show.collection_name.as_deref() {
            let results = self
                .itunes
                .search(SearchParams {
                    term: show_name,
                    country: &link.country,
                    media: "podcast",
                    entity: "podcastEpisode",
                    limit: EPISODE_SEARCH_LIMIT,
                    collection_id: Some(show_id),
                })
                .await?;
            episode_name = find_episode_name(&results, &link.id);
        }
        if episode_name.is_none() {
            warn!(
                episode = link.id,
                show = show_id,
                "episode name not recovered, searching with show metadata only"
            );
        }
        Ok(NameBag {
            item_name: episode_name,
            artist_name: show.artist_name.clone(),
            collection_name: show.collection_name.clone(),
        })
    }
}

fn find_episode_name(results: &[ItunesItem], episode_id: &str) -> Option<String> {
    results
        .iter()
        .find(|row| {
            row.kind.as_deref() == Some("podcast-episode")
                && row.track_id.is_some_and(|id| id.to_string() == episode_id)
        })
        .and_then(|row| row.track_name.clone())
}

fn assemble_apple_result(
    link: &ParsedLink,
    item: &SpotifyItem,
    candidate: Option<&ItunesItem>,
) -> ConversionResult {
    let output_url = candidate.and_then(|row| matcher::apple_url(row, link.kind));
    ConversionResult {
        source_catalog: Catalog::Spotify,
        target_catalog: Catalog::Apple,
        input_url: link.original_url.clone(),
        output_url,
        details: ConversionDetails {
            source: ItemSummary {
                kind: Some(link.kind.to_string()),
                id: Some(link.id.clone()),
                show_id: None,
                name: item.name().map(str::to_string),
                artist: item.artist(),
                collection: item.collection(),
            },
            target: candidate.map(summarize_itunes),
        },
    }
}

fn assemble_spotify_result(
    link: &ParsedLink,
    names: &NameBag,
    hit: Option<SpotifyHit>,
) -> ConversionResult {
    let output_url = hit
        .as_ref()
        .and_then(|row| row.id.as_deref())
        .map(|id| matcher::spotify_url(link.kind, id));
    ConversionResult {
        source_catalog: Catalog::Apple,
        target_catalog: Catalog::Spotify,
        input_url: link.original_url.clone(),
        output_url,
        details: ConversionDetails {
            source: ItemSummary {
                kind: Some(link.kind.to_string()),
                id: Some(link.id.clone()),
                show_id: link.show_id.clone(),
                name: names
                    .item_name
                    .clone()
                    .or_else(|| names.collection_name.clone())
                    .or_else(|| names.artist_name.clone()),
                artist: names.artist_name.clone(),
                collection: names.collection_name.clone(),
            },
            target: hit.map(|row| ItemSummary {
                kind: Some(link.kind.to_string()),
                id: row.id,
                show_id: None,
                name: row.name,
                artist: None,
                collection: None,
            }),
        },
    }
}

fn summarize_itunes(row: &ItunesItem) -> ItemSummary {
    ItemSummary {
        kind: row.kind.clone().or_else(|| row.wrapper_type.clone()),
        id: row
            .track_id
            .or(row.collection_id)
            .or(row.artist_id)
            .map(|id| id.to_string()),
        show_id: None,
        name: row
            .track_name
            .clone()
            .or_else(|| row.collection_name.clone())
            .or_else(|| row.artist_name.clone()),
        artist: row.artist_name.clone(),
        collection: row.collection_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use songport_core::{Catalog, MediaKind};
    use songport_links::ParsedLink;

    use super::{assemble_apple_result, assemble_spotify_result, find_episode_name};
    use crate::api::itunes::ItunesItem;
    use crate::api::spotify::{SpotifyHit, SpotifyItem};
    use crate::matcher::NameBag;

    fn spotify_track_link() -> ParsedLink {
        ParsedLink {
            source: Catalog::Spotify,
            kind: MediaKind::Track,
            id: "4Km5HrUvYTaSUfiSGPJeQR".to_string(),
            show_id: None,
            country: "us".to_string(),
            original_url: "https://open.spotify.com/track/4Km5HrUvYTaSUfiSGPJeQR".to_string(),
        }
    }

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
    fn no_candidate_still_reports_the_source_side() {
        let result = assemble_apple_result(&spotify_track_link(), &track_item(), None);
        assert!(result.output_url.is_none());
        assert!(result.details.target.is_none());
        assert_eq!(result.details.source.name.as_deref(), Some("Yellow"));
        assert_eq!(result.details.source.kind.as_deref(), Some("track"));
    }

    #[test]
    fn candidate_produces_the_view_url_and_target_summary() {
        let row = itunes_row(json!({
            "kind": "song",
            "trackId": 1122782511u64,
            "trackName": "Yellow",
            "artistName": "Coldplay",
            "collectionName": "Parachutes",
            "trackViewUrl": "https://music.apple.com/us/album/yellow/1122782283?i=1122782511"
        }));
        let result = assemble_apple_result(&spotify_track_link(), &track_item(), Some(&row));
        assert_eq!(
            result.output_url.as_deref(),
            Some("https://music.apple.com/us/album/yellow/1122782283?i=1122782511")
        );
        let target = result.details.target.unwrap();
        assert_eq!(target.kind.as_deref(), Some("song"));
        assert_eq!(target.id.as_deref(), Some("1122782511"));
    }

    #[test]
    fn spotify_result_builds_the_open_url_from_the_hit() {
        let link = ParsedLink {
            source: Catalog::Apple,
            kind: MediaKind::Episode,
            id: "123".to_string(),
            show_id: Some("456".to_string()),
            country: "us".to_string(),
            original_url: "https://podcasts.apple.com/us/podcast/the-daily/id456?i=123"
                .to_string(),
        };
        let names = NameBag {
            item_name: Some("Part One".to_string()),
            artist_name: Some("NYT".to_string()),
            collection_name: Some("The Daily".to_string()),
        };
        let hit = SpotifyHit {
            id: Some("512ojhOuo1ktJprKbVcKyQ".to_string()),
            name: Some("Part One".to_string()),
        };
        let result = assemble_spotify_result(&link, &names, Some(hit));
        assert_eq!(
            result.output_url.as_deref(),
            Some("https://open.spotify.com/episode/512ojhOuo1ktJprKbVcKyQ")
        );
        assert_eq!(result.details.source.show_id.as_deref(), Some("456"));
    }

    #[test]
    fn spotify_no_hit_is_not_an_error() {
        let link = ParsedLink {
            source: Catalog::Apple,
            kind: MediaKind::Album,
            id: "789".to_string(),
            show_id: None,
            country: "us".to_string(),
            original_url: "https://music.apple.com/us/album/parachutes/789".to_string(),
        };
        let names = NameBag {
            item_name: None,
            artist_name: Some("Coldplay".to_string()),
            collection_name: Some("Parachutes".to_string()),
        };
        let result = assemble_spotify_result(&link, &names, None);
        assert!(result.output_url.is_none());
        assert_eq!(result.details.source.name.as_deref(), Some("Parachutes"));
        assert!(result.details.target.is_none());
    }

    #[test]
    fn episode_name_requires_a_matching_track_id() {
        let results = vec![
            itunes_row(json!({ "kind": "podcast-episode", "trackId": 1u64, "trackName": "Other" })),
            itunes_row(json!({ "kind": "podcast-episode", "trackId": 123u64, "trackName": "Part One" })),
            itunes_row(json!({ "kind": "podcast", "trackId": 123u64, "trackName": "Not An Episode" })),
        ];
        assert_eq!(find_episode_name(&results, "123").as_deref(), Some("Part One"));
        assert!(find_episode_name(&results, "999").is_none());
        assert!(find_episode_name(&[], "123").is_none());
    }
}
