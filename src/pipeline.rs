//! Batch fetch pipeline
//!
//! Runs the chosen items of a batch through resolve, fetch-with-retry and
//! tagging on a fixed pool of workers. Item failures degrade to a `Failed`
//! outcome; they never abort the rest of the batch. Outcomes come back in
//! input order regardless of completion order.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::providers::{
    MediaFetcher, MediaResolver, MetadataLookup, Tagger, is_recognized_locator,
};
use crate::retry::{IsRetryable, with_retry};
use crate::types::{CandidateItem, FetchOutcome, LookupResult, MediaSource, TrackTags};
use crate::utils::unique_audio_path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fetches batches of candidate items into local audio artifacts
#[derive(Clone)]
pub struct FetchPipeline {
    lookup: Arc<dyn MetadataLookup>,
    resolver: Arc<dyn MediaResolver>,
    fetcher: Arc<dyn MediaFetcher>,
    tagger: Arc<dyn Tagger>,
    config: Arc<Config>,
    workers: Arc<Semaphore>,
}

impl FetchPipeline {
    /// Create a pipeline with a worker pool sized from the config
    pub fn new(
        lookup: Arc<dyn MetadataLookup>,
        resolver: Arc<dyn MediaResolver>,
        fetcher: Arc<dyn MediaFetcher>,
        tagger: Arc<dyn Tagger>,
        config: Arc<Config>,
    ) -> Self {
        let workers = Arc::new(Semaphore::new(config.fetch.worker_pool_size));
        Self {
            lookup,
            resolver,
            fetcher,
            tagger,
            config,
            workers,
        }
    }

    /// Fetch every item of a batch, bounded by the worker pool
    ///
    /// The returned vector has one outcome per input item, in input order.
    /// This method never fails as a whole; per-item failures are recorded in
    /// their outcomes.
    pub async fn fetch_batch(&self, items: Vec<CandidateItem>) -> Vec<FetchOutcome> {
        let total = items.len();
        tracing::info!(total, "Starting batch fetch");

        // Keep a copy so a panicked worker can still be reported as a
        // failed outcome for its item.
        let originals = items.clone();
        let mut handles = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            let permit = match Arc::clone(&self.workers).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // The semaphore is never closed; treat this as a failed
                    // item rather than aborting the batch.
                    handles.push(tokio::spawn(async move {
                        (index, FetchOutcome::failed(item, 0))
                    }));
                    continue;
                }
            };

            let pipeline = self.clone();
            handles.push(tokio::spawn(async move {
                let outcome = pipeline.fetch_item(item).await;
                drop(permit);
                (index, outcome)
            }));
        }

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; total];
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Fetch worker panicked"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| FetchOutcome::failed(originals[index].clone(), 0))
            })
            .collect()
    }

    /// Run one item through resolve, fetch-with-retry and tagging
    async fn fetch_item(&self, item: CandidateItem) -> FetchOutcome {
        let (locator, tags) = match self.resolve_locator(&item).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(title = %item.title, error = %e, "Could not resolve item");
                return FetchOutcome::failed(item, 0);
            }
        };

        let destination = unique_audio_path(&self.config.fetch.temp_dir);

        let (result, attempts) = with_retry(&self.config.fetch.retry, || {
            let locator = locator.clone();
            let destination = destination.clone();
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                fetcher
                    .fetch(&locator, &destination)
                    .await
                    .map_err(FetchError)?;
                let metadata = tokio::fs::metadata(&destination).await.map_err(|_| {
                    FetchError(Error::EmptyArtifact {
                        path: destination.clone(),
                    })
                })?;
                if metadata.len() == 0 {
                    return Err(FetchError(Error::EmptyArtifact { path: destination }));
                }
                Ok(())
            }
        })
        .await;

        match result {
            Ok(()) => {
                if let Err(e) = self.tagger.tag(&destination, &tags).await {
                    // Tagging is best-effort; the untagged artifact still ships.
                    tracing::warn!(title = %item.title, error = %e, "Tagging failed");
                }
                tracing::debug!(title = %item.title, attempts, "Item fetched");
                FetchOutcome::succeeded(item, destination, attempts)
            }
            Err(FetchError(cause)) => {
                let failure = Error::Fetch {
                    title: item.title.clone(),
                    attempts,
                };
                tracing::warn!(
                    error = %failure,
                    cause = %cause,
                    transient = cause.is_retryable(),
                    "Item fetch failed"
                );
                // Remove any partial file so nothing leaks from failed fetches
                let _ = tokio::fs::remove_file(&destination).await;
                FetchOutcome::failed(item, attempts)
            }
        }
    }

    /// Resolve an item's source to a fetchable locator and its tags
    async fn resolve_locator(&self, item: &CandidateItem) -> Result<(String, TrackTags)> {
        match &item.source {
            MediaSource::Direct(locator) => {
                if !is_recognized_locator(locator, &self.config.media.allowed_hosts) {
                    return Err(Error::LocatorNotFound {
                        query: item.title.clone(),
                    });
                }
                let tags = TrackTags {
                    title: item.title.clone(),
                    artist: item.uploader.clone(),
                    album: item.source_album.clone(),
                    art_url: None,
                };
                Ok((locator.clone(), tags))
            }
            MediaSource::Streaming(reference) => {
                let metadata = match self.lookup.lookup(reference).await? {
                    LookupResult::Track(metadata) => metadata,
                    _ => {
                        return Err(Error::Resolution {
                            reference: reference.clone(),
                            reason: "expected a single track".to_string(),
                        });
                    }
                };
                let query = format!("{} - {}", metadata.artist, metadata.title);
                let locator = self.resolver.resolve(&query).await?;
                if !is_recognized_locator(&locator, &self.config.media.allowed_hosts) {
                    return Err(Error::LocatorNotFound { query });
                }
                Ok((locator, TrackTags::from(metadata)))
            }
        }
    }
}

/// Error from a single fetch attempt
///
/// Every failure inside the fetch phase earns the full retry allowance,
/// whatever the underlying cause; only resolution, which runs before this
/// phase, fails fast. The wrapped error keeps its transient classification
/// for logging.
struct FetchError(Error);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        true
    }
}
