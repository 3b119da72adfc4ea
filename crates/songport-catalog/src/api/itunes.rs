use reqwest::Client;
use serde::Deserialize;
use songport_core::{MediaKind, SongportError, SongportResult};
use tracing::debug;

const LOOKUP_URL: &str = "https://itunes.apple.com/lookup";
const SEARCH_URL: &str = "https://itunes.apple.com/search";

#[derive(Debug, Clone)]
pub struct ItunesClient {
    client: Client,
}

/// One result row from the lookup/search APIs. The APIs return a union of
/// track, collection, and artist fields, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItunesItem {
    pub wrapper_type: Option<String>,
    pub kind: Option<String>,
    pub collection_type: Option<String>,
    pub artist_type: Option<String>,
    pub track_id: Option<u64>,
    pub collection_id: Option<u64>,
    pub artist_id: Option<u64>,
    pub track_name: Option<String>,
    pub collection_name: Option<String>,
    pub artist_name: Option<String>,
    pub track_view_url: Option<String>,
    pub collection_view_url: Option<String>,
    pub artist_view_url: Option<String>,
    pub feed_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultPage {
    #[serde(default)]
    results: Vec<ItunesItem>,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchParams<'a> {
    pub term: &'a str,
    pub country: &'a str,
    pub media: &'a str,
    pub entity: &'a str,
    pub limit: u32,
    /// Constrains the search to one collection (used for episode recovery).
    pub collection_id: Option<&'a str>,
}

impl ItunesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Direct by-id lookup; returns the first result or `None` when the id
    /// resolves to nothing.
    pub async fn lookup(
        &self,
        kind: MediaKind,
        id: &str,
        country: &str,
    ) -> SongportResult<Option<ItunesItem>> {
        debug!(%kind, id, country, "looking up itunes item");
        let response = self
            .client
            .get(LOOKUP_URL)
            .query(&[("id", id), ("country", country), ("entity", lookup_entity(kind))])
            .send()
            .await
            .map_err(|err| SongportError::Network(format!("itunes lookup failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(SongportError::Api(format!(
                "itunes lookup returned {status}"
            )));
        }
        let page: ResultPage = response
            .json()
            .await
            .map_err(|err| SongportError::Parse(format!("itunes lookup decode failed: {err}")))?;
        Ok(page.results.into_iter().next())
    }

    pub async fn search(&self, params: SearchParams<'_>) -> SongportResult<Vec<ItunesItem>> {
        debug!(
            term = params.term,
            entity = params.entity,
            country = params.country,
            "searching itunes"
        );
        let limit = params.limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("term", params.term),
            ("country", params.country),
            ("media", params.media),
            ("entity", params.entity),
            ("limit", &limit),
        ];
        if let Some(collection_id) = params.collection_id {
            query.push(("id", collection_id));
        }
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&query)
            .send()
            .await
            .map_err(|err| SongportError::Network(format!("itunes search failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(SongportError::Api(format!(
                "itunes search returned {status}"
            )));
        }
        let page: ResultPage = response
            .json()
            .await
            .map_err(|err| SongportError::Parse(format!("itunes search decode failed: {err}")))?;
        Ok(page.results)
    }
}

/// The lookup API's entity vocabulary for each media kind.
pub fn lookup_entity(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Track => "song",
        MediaKind::Album => "album",
        MediaKind::Artist => "musicArtist",
        MediaKind::Show => "podcast",
        MediaKind::Episode => "podcastEpisode",
    }
}
