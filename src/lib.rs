//! # tune-dl
//!
//! Backend library for chat-driven music download bots.
//!
//! ## Design Philosophy
//!
//! tune-dl is designed to be:
//! - **Transport-agnostic** - The chat platform, metadata service, media
//!   platform and tag writer are all injected as trait objects
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! The engine turns inbound chat messages into search sessions the user can
//! page through and select from, then fetches the chosen tracks on a bounded
//! worker pool and delivers them back through the messaging channel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tune_dl::{Collaborators, Config, InboundEvent, TuneDownloader, UserId};
//! # fn collaborators() -> Collaborators { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = TuneDownloader::new(Config::default(), collaborators())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Feed inbound chat events to the engine
//!     downloader
//!         .handle_event(InboundEvent::Text {
//!             user: UserId(42),
//!             text: "bohemian rhapsody".to_string(),
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Delivery sequencing after a batch completes
pub mod delivery;
/// The engine and event dispatch
pub mod engine;
/// Error types
pub mod error;
/// Keep-alive HTTP endpoint
pub mod liveness;
/// Pure paging computation
pub mod pager;
/// Batch fetch pipeline
pub mod pipeline;
/// Collaborator contracts
pub mod providers;
/// Retry logic with exponential backoff
pub mod retry;
/// Reply grammar parsing
pub mod selection;
/// Per-user session storage
pub mod session;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, FetchConfig, LivenessConfig, MediaConfig, RetryConfig, SelectionConfig};
pub use delivery::{BatchSummary, DeliverySequencer};
pub use engine::{Collaborators, TuneDownloader};
pub use error::{Error, Result};
pub use pipeline::FetchPipeline;
pub use providers::{MediaFetcher, MediaResolver, MessagingChannel, MetadataLookup, Tagger};
pub use selection::SelectionAction;
pub use session::SessionStore;
pub use types::{
    AudioArtifact, ButtonPress, CandidateItem, Event, FetchOutcome, FetchStatus, InboundEvent,
    LookupResult, MediaSource, MessageRef, ResultSet, Session, TrackMetadata, TrackTags, UserId,
};

/// Helper function to run the engine with graceful signal handling.
///
/// Waits for a termination signal and then calls the engine's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use tune_dl::{Collaborators, Config, TuneDownloader, run_with_shutdown};
/// # fn collaborators() -> Collaborators { unimplemented!() }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = TuneDownloader::new(Config::default(), collaborators())?;
///     let liveness = downloader.spawn_liveness_server();
///
///     run_with_shutdown(downloader).await;
///     if let Some(server) = liveness {
///         server.abort();
///     }
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: TuneDownloader) {
    wait_for_signal().await;
    downloader.shutdown().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
