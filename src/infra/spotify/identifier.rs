//! Extraction of catalog ids from user input.

const PLAYLIST_URI_PREFIX: &str = "spotify:playlist:";
const ARTIST_URI_PREFIX: &str = "spotify:artist:";
const SPOTIFY_HOST: &str = "spotify.com/";
const ARTIST_PATH: &str = "/artist/";

/// Last path segment of a URL with its query string removed.
fn last_segment(input: &str) -> &str {
    let without_query = input.split(['?', '#']).next().unwrap_or_default();
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Playlist id from a share URL, a `spotify:playlist:` URI or a bare id.
pub fn playlist_id(identifier: &str) -> Option<String> {
    let identifier = identifier.trim();
    let id = match identifier.strip_prefix(PLAYLIST_URI_PREFIX) {
        Some(rest) => rest,
        None => last_segment(identifier),
    };
    (!id.is_empty()).then(|| id.to_string())
}

/// Artist id when the input is an artist URL or URI.
///
/// Returns `None` for anything else, which callers treat as an artist name.
pub fn artist_id(identifier: &str) -> Option<String> {
    let identifier = identifier.trim();
    // share links may carry a locale segment: open.spotify.com/intl-it/artist/<id>
    let id = if identifier.contains(SPOTIFY_HOST) && identifier.contains(ARTIST_PATH) {
        last_segment(identifier)
    } else if let Some(rest) = identifier.strip_prefix(ARTIST_URI_PREFIX) {
        rest.rsplit(':').next().unwrap_or_default()
    } else {
        return None;
    };
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_id_from_url_with_query() {
        assert_eq!(
            playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc123").as_deref(),
            Some("37i9dQZF1DXcBWIGoYBM5M")
        );
    }

    #[test]
    fn test_playlist_id_from_url_with_trailing_slash() {
        assert_eq!(
            playlist_id("https://open.spotify.com/playlist/abc/").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_playlist_id_from_uri_and_bare_id() {
        assert_eq!(playlist_id("spotify:playlist:xyz").as_deref(), Some("xyz"));
        assert_eq!(playlist_id("  xyz  ").as_deref(), Some("xyz"));
    }

    #[test]
    fn test_playlist_id_empty() {
        assert_eq!(playlist_id(""), None);
        assert_eq!(playlist_id("   "), None);
        assert_eq!(playlist_id("?si=1"), None);
    }

    #[test]
    fn test_artist_id_from_url() {
        assert_eq!(
            artist_id("https://open.spotify.com/artist/4Z8W4fKeB5YxbusRsdQVPb?si=q").as_deref(),
            Some("4Z8W4fKeB5YxbusRsdQVPb")
        );
        assert_eq!(
            artist_id("https://open.spotify.com/intl-it/artist/4Z8W4fKeB5YxbusRsdQVPb").as_deref(),
            Some("4Z8W4fKeB5YxbusRsdQVPb")
        );
    }

    #[test]
    fn test_artist_id_from_uri() {
        assert_eq!(artist_id("spotify:artist:4Z8W").as_deref(), Some("4Z8W"));
    }

    #[test]
    fn test_artist_name_has_no_id() {
        assert_eq!(artist_id("Radiohead"), None);
        assert_eq!(artist_id("https://open.spotify.com/playlist/abc"), None);
    }
}
