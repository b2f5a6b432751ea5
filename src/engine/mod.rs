//! The `TuneDownloader` engine
//!
//! Owns the session store, fetch pipeline, delivery sequencer and the event
//! channel, and dispatches inbound chat events to them. Collaborator
//! implementations are injected at construction; the engine itself never
//! talks to the network directly.

mod dispatch;
mod render;
mod resolve;


use crate::config::Config;
use crate::delivery::DeliverySequencer;
use crate::error::Result;
use crate::liveness;
use crate::pipeline::FetchPipeline;
use crate::providers::{MediaFetcher, MediaResolver, MessagingChannel, MetadataLookup, Tagger};
use crate::session::SessionStore;
use crate::types::Event;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Event channel capacity; slow subscribers miss events rather than
/// backpressuring the engine
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The collaborator implementations an engine is built from
pub struct Collaborators {
    /// Streaming-service metadata lookup
    pub lookup: Arc<dyn MetadataLookup>,
    /// Media platform search and locator resolution
    pub resolver: Arc<dyn MediaResolver>,
    /// Audio byte fetcher
    pub fetcher: Arc<dyn MediaFetcher>,
    /// Tag embedder
    pub tagger: Arc<dyn Tagger>,
    /// Outbound messaging surface
    pub channel: Arc<dyn MessagingChannel>,
}

/// Chat-driven music download engine
///
/// Cheap to clone; all state is behind `Arc`s.
#[derive(Clone)]
pub struct TuneDownloader {
    config: Arc<Config>,
    sessions: Arc<SessionStore>,
    pipeline: FetchPipeline,
    delivery: DeliverySequencer,
    lookup: Arc<dyn MetadataLookup>,
    resolver: Arc<dyn MediaResolver>,
    channel: Arc<dyn MessagingChannel>,
    event_tx: broadcast::Sender<Event>,
}

impl TuneDownloader {
    /// Create an engine from a config and its collaborators
    ///
    /// Validates the config and prepares the temp directory.
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.fetch.temp_dir)?;

        let config = Arc::new(config);
        let pipeline = FetchPipeline::new(
            Arc::clone(&collaborators.lookup),
            Arc::clone(&collaborators.resolver),
            Arc::clone(&collaborators.fetcher),
            Arc::clone(&collaborators.tagger),
            Arc::clone(&config),
        );
        let delivery = DeliverySequencer::new(Arc::clone(&collaborators.channel));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            temp_dir = %config.fetch.temp_dir.display(),
            workers = config.fetch.worker_pool_size,
            "Engine initialized"
        );

        Ok(Self {
            config,
            sessions: Arc::new(SessionStore::new()),
            pipeline,
            delivery,
            lookup: collaborators.lookup,
            resolver: collaborators.resolver,
            channel: collaborators.channel,
            event_tx,
        })
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the engine configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Access the session store
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Start the liveness endpoint when enabled in the config
    pub fn spawn_liveness_server(&self) -> Option<JoinHandle<Result<()>>> {
        if !self.config.liveness.enabled {
            return None;
        }
        Some(tokio::spawn(liveness::serve(Arc::clone(&self.config))))
    }

    /// Log final state before the process exits
    pub async fn shutdown(&self) {
        let active = self.sessions.len().await;
        tracing::info!(active_sessions = active, "Engine shutting down");
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // Nobody listening is fine
        let _ = self.event_tx.send(event);
    }
}
