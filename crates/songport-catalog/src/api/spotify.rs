use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use songport_core::{MediaKind, SongportError, SongportResult};
use tracing::debug;

use crate::auth::TokenProvider;

const API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    tokens: Arc<TokenProvider>,
}

/// Only the fields the matcher and summaries consume; anything missing in the
/// upstream payload decodes to `None` rather than failing.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
    pub album: Option<SpotifyCollectionRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyShow {
    pub name: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyEpisode {
    pub name: Option<String>,
    pub show: Option<SpotifyShowRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtistRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyCollectionRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyShowRef {
    pub name: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SpotifyItem {
    Track(SpotifyTrack),
    Album(SpotifyAlbum),
    Artist(SpotifyArtist),
    Show(SpotifyShow),
    Episode(SpotifyEpisode),
}

impl SpotifyItem {
    pub fn name(&self) -> Option<&str> {
        match self {
            SpotifyItem::Track(track) => track.name.as_deref(),
            SpotifyItem::Album(album) => album.name.as_deref(),
            SpotifyItem::Artist(artist) => artist.name.as_deref(),
            SpotifyItem::Show(show) => show.name.as_deref(),
            SpotifyItem::Episode(episode) => episode.name.as_deref(),
        }
    }

    pub fn artist(&self) -> Option<String> {
        match self {
            SpotifyItem::Track(track) => joined_names(&track.artists),
            SpotifyItem::Album(album) => joined_names(&album.artists),
            SpotifyItem::Artist(_) => None,
            SpotifyItem::Show(show) => show.publisher.clone(),
            SpotifyItem::Episode(episode) => {
                episode.show.as_ref().and_then(|show| show.publisher.clone())
            }
        }
    }

    pub fn collection(&self) -> Option<String> {
        match self {
            SpotifyItem::Track(track) => track.album.as_ref().and_then(|a| a.name.clone()),
            SpotifyItem::Episode(episode) => {
                episode.show.as_ref().and_then(|show| show.name.clone())
            }
            _ => None,
        }
    }
}

fn joined_names(artists: &[SpotifyArtistRef]) -> Option<String> {
    let names: Vec<&str> = artists.iter().filter_map(|a| a.name.as_deref()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// A search hit; only the id and name are consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyHit {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchBucket {
    #[serde(default)]
    items: Vec<SpotifyHit>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<SearchBucket>,
    albums: Option<SearchBucket>,
    artists: Option<SearchBucket>,
    shows: Option<SearchBucket>,
    episodes: Option<SearchBucket>,
}

impl SpotifyClient {
    pub fn new(client: Client, tokens: Arc<TokenProvider>) -> Self {
        Self { client, tokens }
    }

    pub async fn fetch_details(&self, kind: MediaKind, id: &str) -> SongportResult<SpotifyItem> {
        let token = self.tokens.bearer().await?;
        let url = format!("{API_BASE}/{}/{id}", path_segment(kind));
        debug!(%kind, id, "fetching spotify details");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| SongportError::Network(format!("spotify request failed: {err}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SongportError::NotFound(format!("spotify {kind}/{id}")));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(SongportError::Api(format!(
                "spotify {kind} endpoint returned {status}"
            )));
        }
        decode_item(response, kind).await
    }

    /// Searches the catalog and returns the first item of the kind's result
    /// bucket, with no further filtering.
    pub async fn search(&self, query: &str, kind: MediaKind) -> SongportResult<Option<SpotifyHit>> {
        let token = self.tokens.bearer().await?;
        debug!(%kind, query, "searching spotify");
        let response = self
            .client
            .get(format!("{API_BASE}/search"))
            .bearer_auth(&token)
            .query(&[("q", query), ("type", kind.as_str()), ("limit", "5")])
            .send()
            .await
            .map_err(|err| SongportError::Network(format!("spotify search failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(SongportError::Api(format!(
                "spotify search returned {status}"
            )));
        }
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|err| SongportError::Parse(format!("spotify search decode failed: {err}")))?;
        let bucket = match kind {
            MediaKind::Track => body.tracks,
            MediaKind::Album => body.albums,
            MediaKind::Artist => body.artists,
            MediaKind::Show => body.shows,
            MediaKind::Episode => body.episodes,
        };
        Ok(bucket.map(|b| b.items).unwrap_or_default().into_iter().next())
    }
}

async fn decode_item(response: reqwest::Response, kind: MediaKind) -> SongportResult<SpotifyItem> {
    let map_err =
        |err: reqwest::Error| SongportError::Parse(format!("spotify {kind} decode failed: {err}"));
    let item = match kind {
        MediaKind::Track => SpotifyItem::Track(response.json().await.map_err(map_err)?),
        MediaKind::Album => SpotifyItem::Album(response.json().await.map_err(map_err)?),
        MediaKind::Artist => SpotifyItem::Artist(response.json().await.map_err(map_err)?),
        MediaKind::Show => SpotifyItem::Show(response.json().await.map_err(map_err)?),
        MediaKind::Episode => SpotifyItem::Episode(response.json().await.map_err(map_err)?),
    };
    Ok(item)
}

fn path_segment(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Track => "tracks",
        MediaKind::Album => "albums",
        MediaKind::Artist => "artists",
        MediaKind::Show => "shows",
        MediaKind::Episode => "episodes",
    }
}
