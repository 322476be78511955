//! Direct media URL detection for intercepted resource requests.

/// Substrings marking a request as a media file or playlist.
const MEDIA_MARKERS: &[&str] = &[".mp4", ".m3u8", ".mkv", ".ts"];

/// Substrings that veto a match (icons that happen to share a marker).
const FALSE_POSITIVES: &[&str] = &["favicon", ".png"];

/// Whether an intercepted request URL looks like direct media.
///
/// Plain substring tests, case-insensitive: `video.mp4/favicon` is rejected
/// even though it contains `.mp4`.
#[must_use]
pub fn is_media_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    MEDIA_MARKERS.iter().any(|m| lower.contains(m))
        && !FALSE_POSITIVES.iter().any(|fp| lower.contains(fp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_media_urls() {
        let cases = [
            ("https://x.com/video.mp4", true),
            ("https://x.com/video.MP4", true),
            ("https://example.com/video.m3u8?token=123", true),
            ("https://example.com/segment.ts", true),
            ("HTTPS://SERVER.COM/MOVIE.MKV", true),
            ("https://x.com/favicon.png", false),
            ("https://example.com/image.png", false),
            ("https://example.com/favicon.ico", false),
            ("https://x.com/video.mp4/favicon", false),
            ("https://example.com/data.json", false),
        ];
        for (url, expected) in cases {
            assert_eq!(is_media_url(url), expected, "{url}");
        }
    }
}
