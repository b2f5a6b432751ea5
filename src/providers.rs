//! Collaborator contracts
//!
//! The engine talks to the outside world through these traits only: metadata
//! lookup, candidate search and locator resolution, byte fetching, tag
//! embedding, and the messaging channel. Implementations live outside this
//! crate; tests supply in-process mocks.

use crate::error::Result;
use crate::types::{AudioArtifact, CandidateItem, LookupResult, MessageRef, TrackTags, UserId};
use async_trait::async_trait;
use std::path::Path;
use url::Url;

/// Resolves streaming-service references to track metadata
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Look up a reference (track, album, playlist or artist link)
    ///
    /// Returns [`Error::Resolution`](crate::Error::Resolution) when the
    /// reference cannot be mapped to metadata.
    async fn lookup(&self, reference: &str) -> Result<LookupResult>;
}

/// Searches a media platform and resolves queries to fetchable locators
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Search the platform for candidates matching a free-text query
    ///
    /// An empty vector means no results; that is not an error.
    async fn search(&self, query: &str) -> Result<Vec<CandidateItem>>;

    /// Resolve a query to the single best fetchable locator
    ///
    /// Returns [`Error::LocatorNotFound`](crate::Error::LocatorNotFound)
    /// when nothing usable matches.
    async fn resolve(&self, query: &str) -> Result<String>;
}

/// Fetches audio bytes from a locator into a local file
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the audio at `locator` into `destination`
    ///
    /// Any error is retried up to the configured attempt bound; there is no
    /// need to classify failures. The pipeline verifies the artifact
    /// afterwards, so implementations do not need to guarantee a non-empty
    /// file on success.
    async fn fetch(&self, locator: &str, destination: &Path) -> Result<()>;
}

/// Embeds track tags into a fetched artifact
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Write `tags` into the artifact at `path`
    ///
    /// Failures are non-fatal to the pipeline; the untagged artifact is
    /// still delivered.
    async fn tag(&self, path: &Path, tags: &TrackTags) -> Result<()>;
}

/// Outbound messaging surface
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Send a status message, returning a handle for later edits
    async fn send_status(&self, user: UserId, text: &str) -> Result<MessageRef>;

    /// Replace the text of a previously sent status message
    async fn edit_status(&self, user: UserId, message: MessageRef, text: &str) -> Result<()>;

    /// Deliver an audio artifact to the user
    async fn send_artifact(&self, user: UserId, artifact: &AudioArtifact) -> Result<()>;
}

/// Check whether a locator points at one of the recognized media hosts
///
/// Accepts `http`/`https` URLs whose host is an allowed host or one of its
/// subdomains. Anything else is rejected before it reaches the fetcher.
#[must_use]
pub fn is_recognized_locator(locator: &str, allowed_hosts: &[String]) -> bool {
    let Ok(url) = Url::parse(locator) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    allowed_hosts
        .iter()
        .any(|h| host == h || host.ends_with(&format!(".{h}")))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["youtube.com".to_string(), "youtu.be".to_string()]
    }

    #[test]
    fn accepts_allowed_hosts_and_subdomains() {
        assert!(is_recognized_locator(
            "https://youtube.com/watch?v=abc",
            &hosts()
        ));
        assert!(is_recognized_locator(
            "https://www.youtube.com/watch?v=abc",
            &hosts()
        ));
        assert!(is_recognized_locator(
            "https://music.youtube.com/watch?v=abc",
            &hosts()
        ));
        assert!(is_recognized_locator("http://youtu.be/abc", &hosts()));
    }

    #[test]
    fn rejects_unknown_hosts() {
        assert!(!is_recognized_locator(
            "https://example.com/watch?v=abc",
            &hosts()
        ));
        assert!(!is_recognized_locator(
            "https://notyoutube.com/watch?v=abc",
            &hosts()
        ));
        // Suffix match must be on a label boundary
        assert!(!is_recognized_locator(
            "https://evilyoutube.com/x",
            &hosts()
        ));
    }

    #[test]
    fn rejects_non_http_schemes_and_garbage() {
        assert!(!is_recognized_locator("ftp://youtube.com/x", &hosts()));
        assert!(!is_recognized_locator("not a url", &hosts()));
        assert!(!is_recognized_locator("", &hosts()));
    }
}
