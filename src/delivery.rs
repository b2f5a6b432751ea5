//! Delivery sequencing
//!
//! Delivers the artifacts of a finished batch strictly after every fetch has
//! reached a terminal state, in input order, then releases all artifacts,
//! reports one aggregate summary and finally clears the owner's session.

use crate::providers::MessagingChannel;
use crate::session::SessionStore;
use crate::types::{AudioArtifact, FetchOutcome, FetchStatus, UserId};
use crate::utils::{sanitize_filename, truncate_chars};
use std::sync::Arc;

/// Character limit for the title and performer fields of an audio message
const FIELD_CHAR_LIMIT: usize = 64;

/// Aggregate result of one delivered batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items delivered to the channel
    pub delivered: usize,
    /// Items that never produced an artifact
    pub fetch_failed: usize,
    /// Items fetched but rejected by the channel
    pub delivery_failed: usize,
    /// Total items in the batch
    pub total: usize,
    /// Titles of items that did not reach the user, in batch order
    pub incomplete: Vec<String>,
}

impl BatchSummary {
    /// Render the user-facing summary message
    pub fn message(&self) -> String {
        if self.total > 0 && self.delivered == self.total {
            return format!("✅ All {}/{} files sent!", self.delivered, self.total);
        }
        if self.delivered == 0 {
            return "❌ No files were sent. Please try the process again.".to_string();
        }
        let mut message = format!("⚠️ Sent {}/{} files.", self.delivered, self.total);
        if !self.incomplete.is_empty() {
            message.push_str("\nCould not send:");
            for title in &self.incomplete {
                message.push_str(&format!("\n- {title}"));
            }
        }
        message
    }
}

/// Delivers fetched artifacts and closes out the batch
#[derive(Clone)]
pub struct DeliverySequencer {
    channel: Arc<dyn MessagingChannel>,
}

impl DeliverySequencer {
    /// Create a sequencer over the messaging channel
    pub fn new(channel: Arc<dyn MessagingChannel>) -> Self {
        Self { channel }
    }

    /// Deliver a batch's artifacts and finish the interaction
    ///
    /// Per-item delivery failures demote that item to the incomplete list
    /// without stopping the rest. Every artifact is removed afterwards
    /// whether or not its delivery succeeded, and the session is cleared
    /// only after cleanup and the summary, so observers never see a cleared
    /// session with artifacts still pending.
    pub async fn deliver_batch(
        &self,
        user: UserId,
        outcomes: &[FetchOutcome],
        store: &SessionStore,
    ) -> BatchSummary {
        let successes = outcomes
            .iter()
            .filter(|o| o.status == FetchStatus::Succeeded)
            .count();

        let mut summary = BatchSummary {
            delivered: 0,
            fetch_failed: 0,
            delivery_failed: 0,
            total: outcomes.len(),
            incomplete: Vec::new(),
        };

        let mut position = 0usize;
        for outcome in outcomes {
            match (&outcome.status, &outcome.artifact_path) {
                (FetchStatus::Succeeded, Some(path)) => {
                    position += 1;
                    let artifact = build_artifact(outcome, path, position, successes);
                    match self.channel.send_artifact(user, &artifact).await {
                        Ok(()) => summary.delivered += 1,
                        Err(e) => {
                            tracing::warn!(
                                user = %user,
                                title = %outcome.item.title,
                                error = %e,
                                "Artifact delivery failed"
                            );
                            summary.delivery_failed += 1;
                            summary.incomplete.push(outcome.item.title.clone());
                        }
                    }
                }
                _ => {
                    summary.fetch_failed += 1;
                    summary.incomplete.push(outcome.item.title.clone());
                }
            }
        }

        // Release every artifact regardless of delivery result
        for outcome in outcomes {
            if let Some(path) = &outcome.artifact_path {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    tracing::warn!(path = %path.display(), error = %e, "Could not remove artifact");
                }
            }
        }

        if let Err(e) = self.channel.send_status(user, &summary.message()).await {
            tracing::warn!(user = %user, error = %e, "Could not send batch summary");
        }

        // Cleared last so the interaction closes out in one step
        store.clear(user).await;

        tracing::info!(
            user = %user,
            delivered = summary.delivered,
            fetch_failed = summary.fetch_failed,
            delivery_failed = summary.delivery_failed,
            "Batch delivery complete"
        );
        summary
    }
}

fn build_artifact(
    outcome: &FetchOutcome,
    path: &std::path::Path,
    position: usize,
    successes: usize,
) -> AudioArtifact {
    let item = &outcome.item;
    AudioArtifact {
        path: path.to_path_buf(),
        title: truncate_chars(&item.title, FIELD_CHAR_LIMIT),
        performer: truncate_chars(&item.uploader, FIELD_CHAR_LIMIT),
        caption: format!(
            "🎵 {} by {} ({}/{})",
            item.title, item.uploader, position, successes
        ),
        filename: format!(
            "{} - {}.mp3",
            sanitize_filename(&item.uploader),
            sanitize_filename(&item.title)
        ),
    }
}
