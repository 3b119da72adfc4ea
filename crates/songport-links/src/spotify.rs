use songport_core::{Catalog, MediaKind};
use url::Url;

use crate::{DEFAULT_COUNTRY, ParsedLink};

const HOST: &str = "open.spotify.com";

pub fn parse(input: &str) -> Option<ParsedLink> {
    let url = Url::parse(input).ok()?;
    if url.domain()? != HOST {
        return None;
    }
    // Scanning for the first known type segment skips locale prefixes like
    // `intl-ja` without special-casing them.
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let type_index = segments.iter().position(|s| kind_from_segment(s).is_some())?;
    let kind = kind_from_segment(segments[type_index])?;
    let id = segments.get(type_index + 1).copied()?;
    if id.is_empty() {
        return None;
    }
    Some(ParsedLink {
        source: Catalog::Spotify,
        kind,
        id: id.to_string(),
        show_id: None,
        country: DEFAULT_COUNTRY.to_string(),
        original_url: input.to_string(),
    })
}

fn kind_from_segment(segment: &str) -> Option<MediaKind> {
    match segment {
        "track" => Some(MediaKind::Track),
        "album" => Some(MediaKind::Album),
        "artist" => Some(MediaKind::Artist),
        "show" => Some(MediaKind::Show),
        "episode" => Some(MediaKind::Episode),
        _ => None,
    }
}
