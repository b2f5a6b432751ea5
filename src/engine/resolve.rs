//! Classification of inbound search text

use crate::config::MediaConfig;
use crate::providers::is_recognized_locator;
use url::Url;

/// What a piece of search text turned out to be
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// A streaming-service link to a single track
    Track(String),
    /// A streaming-service link to an album, playlist or artist page
    Collection(String),
    /// A directly fetchable locator on a recognized media host
    DirectMedia(String),
    /// Free-text search query
    Query(String),
}

/// Classify search text into a reference kind
///
/// Streaming-service links are told apart from collections by their path:
/// `/track/` links resolve to a single track, everything else on a
/// streaming host is treated as a collection.
pub(crate) fn classify_input(text: &str, media: &MediaConfig) -> ReferenceKind {
    if let Some(host) = http_host(text) {
        let on_streaming_host = media
            .streaming_hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")));
        if on_streaming_host {
            // Path check mirrors how streaming services shape their links
            if text.contains("/track/") {
                return ReferenceKind::Track(text.to_string());
            }
            return ReferenceKind::Collection(text.to_string());
        }
    }

    if is_recognized_locator(text, &media.allowed_hosts) {
        return ReferenceKind::DirectMedia(text.to_string());
    }

    ReferenceKind::Query(text.to_string())
}

fn http_host(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().map(str::to_string)
}
