//! In-process mock collaborators shared across the test suites

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::error::{Error, Result};
use crate::providers::{MediaFetcher, MediaResolver, MessagingChannel, MetadataLookup, Tagger};
use crate::types::{
    AudioArtifact, CandidateItem, LookupResult, MediaSource, MessageRef, TrackMetadata, TrackTags,
    UserId,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

/// Build a track metadata record with the given title and artist
pub fn track_metadata(title: &str, artist: &str, reference: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        artist: artist.to_string(),
        album: Some("Test Album".to_string()),
        duration_secs: 215,
        album_art_url: None,
        reference: reference.to_string(),
    }
}

/// Build a directly fetchable candidate on a recognized host
pub fn direct_item(title: &str) -> CandidateItem {
    CandidateItem {
        title: title.to_string(),
        uploader: "Test Artist".to_string(),
        duration_secs: 215,
        source: MediaSource::Direct(format!(
            "https://youtube.com/watch?v={}",
            title.replace(' ', "-")
        )),
        source_artist: None,
        source_album: None,
    }
}

/// Metadata lookup backed by a fixed reference map
#[derive(Default)]
pub struct MockLookup {
    results: HashMap<String, LookupResult>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: &str, result: LookupResult) -> Self {
        self.results.insert(reference.to_string(), result);
        self
    }
}

#[async_trait]
impl MetadataLookup for MockLookup {
    async fn lookup(&self, reference: &str) -> Result<LookupResult> {
        self.results
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::Resolution {
                reference: reference.to_string(),
                reason: "unknown reference".to_string(),
            })
    }
}

/// Resolver with canned search results and a fixed locator answer
pub struct MockResolver {
    search_results: Vec<CandidateItem>,
    locator: Option<String>,
    /// Queries passed to `resolve`, in call order
    pub resolve_queries: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new(search_results: Vec<CandidateItem>) -> Self {
        Self {
            search_results,
            locator: Some("https://youtube.com/watch?v=resolved".to_string()),
            resolve_queries: Mutex::new(Vec::new()),
        }
    }

    /// Make `resolve` fail with `LocatorNotFound`
    pub fn without_locator(mut self) -> Self {
        self.locator = None;
        self
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn search(&self, _query: &str) -> Result<Vec<CandidateItem>> {
        Ok(self.search_results.clone())
    }

    async fn resolve(&self, query: &str) -> Result<String> {
        self.resolve_queries.lock().unwrap().push(query.to_string());
        self.locator.clone().ok_or_else(|| Error::LocatorNotFound {
            query: query.to_string(),
        })
    }
}

/// How a [`MockFetcher`] behaves on each call
pub enum FetchBehavior {
    /// Write these bytes to the destination
    Write(Vec<u8>),
    /// Fail with a transient error this many times, then write bytes
    FailThenSucceed(u32),
    /// Always fail with a transient error
    AlwaysFail,
    /// Always fail with an I/O error of this kind
    AlwaysFailWith(std::io::ErrorKind),
    /// Write a zero-byte file (triggers the empty-artifact check)
    WriteEmpty,
}

/// Fetcher with scripted behavior and a call counter
pub struct MockFetcher {
    behavior: FetchBehavior,
    /// Total `fetch` calls made
    pub calls: AtomicU32,
}

impl MockFetcher {
    pub fn new(behavior: FetchBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
        }
    }

    fn transient() -> Error {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "connection timed out",
        ))
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(&self, _locator: &str, destination: &Path) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FetchBehavior::Write(bytes) => {
                tokio::fs::write(destination, bytes).await?;
                Ok(())
            }
            FetchBehavior::FailThenSucceed(failures) => {
                if call < *failures {
                    Err(Self::transient())
                } else {
                    tokio::fs::write(destination, b"audio bytes").await?;
                    Ok(())
                }
            }
            FetchBehavior::AlwaysFail => Err(Self::transient()),
            FetchBehavior::AlwaysFailWith(kind) => {
                Err(Error::Io(std::io::Error::new(*kind, "scripted failure")))
            }
            FetchBehavior::WriteEmpty => {
                tokio::fs::write(destination, b"").await?;
                Ok(())
            }
        }
    }
}

/// Tagger that records calls and optionally fails
#[derive(Default)]
pub struct MockTagger {
    fail: bool,
    /// Total `tag` calls made
    pub calls: AtomicU32,
}

impl MockTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Tagger for MockTagger {
    async fn tag(&self, path: &Path, _tags: &TrackTags) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Tagging {
                path: path.to_path_buf(),
                reason: "scripted failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Messaging channel that records everything sent through it
#[derive(Default)]
pub struct MockChannel {
    /// Status messages sent, in order
    pub statuses: Mutex<Vec<(UserId, String)>>,
    /// Status edits applied, in order
    pub edits: Mutex<Vec<(UserId, MessageRef, String)>>,
    /// Artifacts delivered, in order
    pub artifacts: Mutex<Vec<(UserId, AudioArtifact)>>,
    fail_titles: HashSet<String>,
    fail_statuses: bool,
    next_id: AtomicI64,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `send_artifact` fail for artifacts with this title
    pub fn failing_for(mut self, title: &str) -> Self {
        self.fail_titles.insert(title.to_string());
        self
    }

    /// Make `send_status` fail with a transport error
    pub fn failing_statuses(mut self) -> Self {
        self.fail_statuses = true;
        self
    }

    /// All status texts sent or edited, in order
    pub fn status_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self
            .statuses
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect();
        texts.extend(self.edits.lock().unwrap().iter().map(|(_, _, t)| t.clone()));
        texts
    }

    /// Titles of delivered artifacts, in delivery order
    pub fn delivered_titles(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, a)| a.title.clone())
            .collect()
    }
}

#[async_trait]
impl MessagingChannel for MockChannel {
    async fn send_status(&self, user: UserId, text: &str) -> Result<MessageRef> {
        if self.fail_statuses {
            return Err(Error::Channel("scripted transport failure".to_string()));
        }
        self.statuses
            .lock()
            .unwrap()
            .push((user, text.to_string()));
        Ok(MessageRef(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_status(&self, user: UserId, message: MessageRef, text: &str) -> Result<()> {
        self.edits
            .lock()
            .unwrap()
            .push((user, message, text.to_string()));
        Ok(())
    }

    async fn send_artifact(&self, user: UserId, artifact: &AudioArtifact) -> Result<()> {
        if self.fail_titles.contains(&artifact.title) {
            return Err(Error::Delivery {
                title: artifact.title.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.artifacts
            .lock()
            .unwrap()
            .push((user, artifact.clone()));
        Ok(())
    }
}
