mod apple;
mod spotify;

use songport_core::{Catalog, MediaKind};

pub const DEFAULT_COUNTRY: &str = "us";

/// A streaming link reduced to the identifiers needed to look it up in the
/// catalog that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub source: Catalog,
    pub kind: MediaKind,
    /// The id used for the catalog lookup. For Apple episode and track links
    /// this is the `?i=` query id when present; the path id is only a
    /// best-effort fallback.
    pub id: String,
    /// Parent show id, kept for Apple episode links that carry one in the path.
    pub show_id: Option<String>,
    pub country: String,
    pub original_url: String,
}

/// Runs both dialect recognizers against the raw input; first match wins.
/// Returns `None` when neither dialect recognizes the URL, including for
/// syntactically malformed input.
pub fn parse(input: &str) -> Option<ParsedLink> {
    spotify::parse(input).or_else(|| apple::parse(input))
}

#[cfg(test)]
mod tests {
    use songport_core::{Catalog, MediaKind};

    use super::parse;

    #[test]
    fn recognizes_both_dialects() {
        let spotify = parse("https://open.spotify.com/album/6QaVfG1pHYl1z15ZxkvVDW").unwrap();
        assert_eq!(spotify.source, Catalog::Spotify);
        assert_eq!(spotify.kind, MediaKind::Album);

        let apple = parse("https://music.apple.com/us/album/parachutes/1122782283").unwrap();
        assert_eq!(apple.source, Catalog::Apple);
        assert_eq!(apple.kind, MediaKind::Album);
    }

    #[test]
    fn rejects_unknown_hosts() {
        assert!(parse("https://example.com/track/1").is_none());
        assert!(parse("https://tidal.com/browse/track/1").is_none());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("not-a-url").is_none());
        assert!(parse("://no-scheme").is_none());
        assert!(parse("").is_none());
    }
}
