//! Error types for tune-dl
//!
//! The taxonomy follows the failure boundaries of the engine: per-item
//! resolution/fetch/delivery failures that degrade to item outcomes, user
//! input errors that leave the session untouched, and the rare store-level
//! failures that abort an interaction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tune-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tune-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_size")
        key: Option<String>,
    },

    /// A streaming-service reference could not be mapped to track metadata
    #[error("could not resolve {reference}: {reason}")]
    Resolution {
        /// The streaming-service reference that failed to resolve
        reference: String,
        /// The reason resolution failed
        reason: String,
    },

    /// No usable media locator was found for a query or metadata record
    #[error("no usable media locator for {query}")]
    LocatorNotFound {
        /// The search query or title that produced no locator
        query: String,
    },

    /// Fetch failed after exhausting the retry bound
    #[error("fetch failed for {title} after {attempts} attempts")]
    Fetch {
        /// Title of the item that could not be fetched
        title: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// A fetch attempt produced a missing or zero-byte artifact
    #[error("fetched artifact missing or empty at {}", path.display())]
    EmptyArtifact {
        /// Destination path that was missing or empty after the fetch
        path: PathBuf,
    },

    /// Tag embedding failed (non-fatal, the untagged artifact is still delivered)
    #[error("tagging failed for {}: {reason}", path.display())]
    Tagging {
        /// Path of the artifact that could not be tagged
        path: PathBuf,
        /// The reason tagging failed
        reason: String,
    },

    /// The messaging channel rejected an artifact upload
    #[error("delivery failed for {title}: {reason}")]
    Delivery {
        /// Title of the item whose delivery failed
        title: String,
        /// The reason delivery failed
        reason: String,
    },

    /// User input did not parse against the active session
    #[error("invalid selection: {input}")]
    InvalidSelection {
        /// The raw user input that failed to parse
        input: String,
    },

    /// Session store corruption (defensive only, should not occur)
    #[error("session store corruption: {0}")]
    StoreCorruption(String),

    /// Messaging channel transport error (status messages, not artifacts)
    #[error("messaging channel error: {0}")]
    Channel(String),

    /// Network error from a collaborator implementation
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested page index is past the end of the result set
    #[error("page {page} out of range ({pages} pages)")]
    PageOutOfRange {
        /// The page index that was requested
        page: usize,
        /// The number of pages that actually exist
        pages: usize,
    },

    /// Liveness server error
    #[error("liveness server error: {0}")]
    Server(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display_includes_title_and_attempts() {
        let err = Error::Fetch {
            title: "Song Title".into(),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Song Title"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn invalid_selection_preserves_raw_input() {
        let err = Error::InvalidSelection {
            input: "ninety-nine".into(),
        };
        assert!(err.to_string().contains("ninety-nine"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout").into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn page_out_of_range_reports_both_indices() {
        let err = Error::PageOutOfRange { page: 7, pages: 3 };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }
}
