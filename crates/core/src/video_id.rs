use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// URL forms we accept, tried in order; the first match wins.
///
/// - `youtube.com/watch?v=VIDEO_ID`
/// - `youtu.be/VIDEO_ID`
/// - `youtube.com/shorts/VIDEO_ID`
fn patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"youtube\.com/watch\?v=([\w-]{11})").expect("valid pattern"),
            Regex::new(r"youtu\.be/([\w-]{11})").expect("valid pattern"),
            Regex::new(r"youtube\.com/shorts/([\w-]{11})").expect("valid pattern"),
        ]
    })
}

/// Extract the canonical 11-character video id from a URL.
///
/// Pure function; no network is attempted. Fails with
/// [`Error::InvalidUrl`] when no supported form matches.
pub fn extract_video_id(url: &str) -> Result<String> {
    for pattern in patterns() {
        if let Some(captures) = pattern.captures(url) {
            return Ok(captures[1].to_string());
        }
    }

    Err(Error::InvalidUrl {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::Error;

    #[test]
    fn standard_url() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn short_url() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn shorts_url() {
        let url = "https://www.youtube.com/shorts/dQw4w9WgXcQ";
        assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn url_with_extra_params() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120";
        assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn url_without_www() {
        let url = "https://youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert_matches!(
            extract_video_id("https://example.com/video"),
            Err(Error::InvalidUrl { .. })
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        assert_matches!(extract_video_id(""), Err(Error::InvalidUrl { .. }));
    }
}
