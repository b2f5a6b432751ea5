//! Core types for tune-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unique identifier for a chat user
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new UserId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a status message, used for later edits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(pub i64);

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the audio bytes for a candidate item come from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MediaSource {
    /// A locator on a recognized media host, fetchable as-is
    Direct(String),
    /// A streaming-service reference that needs a metadata lookup and a
    /// locator resolution before it can be fetched
    Streaming(String),
}

/// One fetchable unit inside a result set.
///
/// Immutable once placed in a [`ResultSet`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Track or video title
    pub title: String,
    /// Uploader or artist name as shown in selection lists
    pub uploader: String,
    /// Duration in whole seconds
    pub duration_secs: u64,
    /// Direct locator or streaming-service reference
    pub source: MediaSource,
    /// Artist provenance when the item came from an artist page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_artist: Option<String>,
    /// Album provenance when the item came from an album
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_album: Option<String>,
}

impl CandidateItem {
    /// Build a candidate from track metadata returned by the metadata lookup
    pub fn from_track(metadata: &TrackMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            uploader: metadata.artist.clone(),
            duration_secs: metadata.duration_secs,
            source: MediaSource::Streaming(metadata.reference.clone()),
            source_artist: None,
            source_album: metadata.album.clone(),
        }
    }
}

/// Ordered, immutable-once-created list of candidate items produced by one
/// resolution step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Candidate items, in resolution order
    pub items: Vec<CandidateItem>,
    /// Display label (playlist, album or artist name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ResultSet {
    /// Create a result set from items and an optional display label
    pub fn new(items: Vec<CandidateItem>, label: Option<String>) -> Self {
        Self { items, label }
    }

    /// Number of candidate items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the result set holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-user pairing of a result set with the current page position
#[derive(Clone, Debug)]
pub struct Session {
    /// Owning user
    pub owner: UserId,
    /// The result set this session pages over
    pub result_set: ResultSet,
    /// Current page index (0-based)
    pub page_index: usize,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session at page 0
    pub fn new(owner: UserId, result_set: ResultSet) -> Self {
        Self {
            owner,
            result_set,
            page_index: 0,
            created_at: Utc::now(),
        }
    }
}

/// Terminal-state classification of one fetched item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Not yet attempted
    Pending,
    /// Fetched to a local artifact
    Succeeded,
    /// All attempts exhausted or a pre-fetch step failed
    Failed,
}

/// Outcome of fetching one chosen item
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    /// The item that was fetched
    pub item: CandidateItem,
    /// Terminal status after the pipeline ran
    pub status: FetchStatus,
    /// Local artifact path, present iff `status == Succeeded`
    pub artifact_path: Option<PathBuf>,
    /// Number of fetch attempts made (0 when resolution failed before any fetch)
    pub attempts: u32,
}

impl FetchOutcome {
    /// Successful outcome with a local artifact
    pub fn succeeded(item: CandidateItem, artifact_path: PathBuf, attempts: u32) -> Self {
        Self {
            item,
            status: FetchStatus::Succeeded,
            artifact_path: Some(artifact_path),
            attempts,
        }
    }

    /// Failed outcome with the number of attempts that were made
    pub fn failed(item: CandidateItem, attempts: u32) -> Self {
        Self {
            item,
            status: FetchStatus::Failed,
            artifact_path: None,
            attempts,
        }
    }
}

/// Track metadata returned by the metadata lookup collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,
    /// Primary artist
    pub artist: String,
    /// Album name, when known
    pub album: Option<String>,
    /// Duration in whole seconds
    pub duration_secs: u64,
    /// Cover art URL, when available
    pub album_art_url: Option<String>,
    /// The streaming-service reference this metadata was resolved from
    pub reference: String,
}

/// Result of a metadata lookup against a streaming-service reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupResult {
    /// A single track
    Track(TrackMetadata),
    /// An album with its track list
    Album {
        /// Album name
        name: String,
        /// Tracks on the album, in album order
        tracks: Vec<TrackMetadata>,
    },
    /// A playlist with its track list
    Playlist {
        /// Playlist name
        name: String,
        /// Tracks in the playlist, in playlist order
        tracks: Vec<TrackMetadata>,
    },
    /// An artist with their collected tracks
    Artist {
        /// Artist name
        name: String,
        /// Collected tracks, duplicates already removed
        tracks: Vec<TrackMetadata>,
    },
}

/// Metadata embedded into a fetched artifact by the tagger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackTags {
    /// Track title
    pub title: String,
    /// Primary artist
    pub artist: String,
    /// Album name, when known
    pub album: Option<String>,
    /// Cover art URL, when available
    pub art_url: Option<String>,
}

impl From<TrackMetadata> for TrackTags {
    fn from(metadata: TrackMetadata) -> Self {
        Self {
            title: metadata.title,
            artist: metadata.artist,
            album: metadata.album,
            art_url: metadata.album_art_url,
        }
    }
}

/// An audio artifact ready to be handed to the messaging channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioArtifact {
    /// Local path of the fetched file
    pub path: PathBuf,
    /// Title field for the audio message (truncated by the sequencer)
    pub title: String,
    /// Performer field for the audio message (truncated by the sequencer)
    pub performer: String,
    /// Caption shown with the file
    pub caption: String,
    /// Suggested download filename
    pub filename: String,
}

/// Paging/discard buttons attached to a result listing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonPress {
    /// Discard the active session
    Discard,
    /// Advance to the next page
    NextPage,
    /// Go back to the previous page
    PrevPage,
}

/// Inbound event from the messaging channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// A text message from a user
    Text {
        /// Sending user
        user: UserId,
        /// Raw message text
        text: String,
    },
    /// A button press on a result listing
    Button {
        /// Pressing user
        user: UserId,
        /// Which button was pressed
        press: ButtonPress,
    },
}

/// Event emitted during the interaction lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new search or reference resolution started
    SearchStarted {
        /// User who initiated the search
        user: UserId,
        /// The query or reference text
        query: String,
    },

    /// A result set was created and a session opened
    ResultsReady {
        /// Owning user
        user: UserId,
        /// Number of candidate items
        count: usize,
        /// Display label, when the source had one
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// A page was rendered to the user
    PageShown {
        /// Owning user
        user: UserId,
        /// Page index shown (0-based)
        page: usize,
    },

    /// The user discarded their session
    SessionDiscarded {
        /// Owning user
        user: UserId,
    },

    /// One item of a batch reached a terminal fetch state
    ItemFetched {
        /// Owning user
        user: UserId,
        /// Item title
        title: String,
        /// Whether the fetch succeeded
        succeeded: bool,
        /// Number of fetch attempts made
        attempts: u32,
    },

    /// A batch finished fetch and delivery
    BatchComplete {
        /// Owning user
        user: UserId,
        /// Items delivered to the channel
        delivered: usize,
        /// Items that failed during fetch
        fetch_failed: usize,
        /// Items fetched but not deliverable
        delivery_failed: usize,
    },
}
