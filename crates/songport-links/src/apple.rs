use regex::Regex;
use songport_core::{Catalog, MediaKind};
use url::Url;

use crate::{DEFAULT_COUNTRY, ParsedLink};

const HOSTS: [&str; 3] = ["music.apple.com", "podcasts.apple.com", "itunes.apple.com"];

/// The Apple dialect normalized to the handful of facts classification needs.
#[derive(Debug)]
struct LinkShape {
    /// Podcast context: podcasts host, or a `podcast` type token on any host.
    podcast: bool,
    type_token: Option<String>,
    path_id: Option<String>,
    query_id: Option<String>,
    country: String,
}

pub fn parse(input: &str) -> Option<ParsedLink> {
    let url = Url::parse(input).ok()?;
    let host = url.domain()?;
    if !HOSTS.contains(&host) {
        return None;
    }
    let shape = extract_shape(&url, host)?;
    let (kind, id, show_id) = classify(&shape)?;
    if id.is_empty() {
        return None;
    }
    Some(ParsedLink {
        source: Catalog::Apple,
        kind,
        id,
        show_id,
        country: shape.country,
        original_url: input.to_string(),
    })
}

fn extract_shape(url: &Url, host: &str) -> Option<LinkShape> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let country_re = Regex::new(r"^[a-zA-Z]{2}$").ok()?;
    let (country, type_index) = match segments.first() {
        Some(first) if country_re.is_match(first) => (first.to_lowercase(), 1),
        _ => (DEFAULT_COUNTRY.to_string(), 0),
    };

    let type_token = segments.get(type_index).map(|s| s.to_string());
    let podcast = host == "podcasts.apple.com" || type_token.as_deref() == Some("podcast");

    let path_id = if podcast {
        // Show ids appear as a bare number or an `id`-prefixed segment
        // anywhere after the type token.
        let id_re = Regex::new(r"^(?:id)?(\d+)$").ok()?;
        segments
            .iter()
            .skip(type_index + 1)
            .find_map(|s| id_re.captures(s))
            .map(|captures| captures[1].to_string())
    } else {
        // Music paths address items as `type/name/id`.
        segments.get(type_index + 2).map(|s| s.to_string())
    };

    let query_id = url
        .query_pairs()
        .find(|(key, _)| key == "i")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty());

    Some(LinkShape {
        podcast,
        type_token,
        path_id,
        query_id,
        country,
    })
}

/// Ordered decision table for the Apple dialect; the first matching row wins.
/// Returns the media kind, the lookup id, and the parent show id when kept.
fn classify(shape: &LinkShape) -> Option<(MediaKind, String, Option<String>)> {
    let token = shape.type_token.as_deref()?;
    let query = shape.query_id.as_deref();
    let path = shape.path_id.as_deref();

    let (kind, id, show_id) = match (shape.podcast, token, query, path) {
        // `?i=` on a podcast host always means an episode; the path id, when
        // present, is the parent show.
        (true, _, Some(id), show) => (MediaKind::Episode, id, show),
        (true, _, None, Some(id)) => (MediaKind::Show, id, None),
        (true, _, None, None) => return None,
        // A song inside an album vs. the album itself.
        (false, "album", Some(id), _) => (MediaKind::Track, id, None),
        (false, "album", None, Some(id)) => (MediaKind::Album, id, None),
        // Artist links take the path id; `?i=` does not apply to artists.
        (false, "artist", _, Some(id)) => (MediaKind::Artist, id, None),
        (false, "artist", _, None) => return None,
        (false, "song" | "track", Some(id), _) => (MediaKind::Track, id, None),
        // Best-effort fallback to the path id when `?i=` is absent.
        (false, "song" | "track", None, Some(id)) => (MediaKind::Track, id, None),
        // Unknown music token with a `?i=` id: playlist/station artifacts,
        // treated as a track lookup with no collection context.
        (false, _, Some(id), _) => (MediaKind::Track, id, None),
        (false, _, None, _) => return None,
    };

    Some((kind, id.to_string(), show_id.map(str::to_string)))
}
