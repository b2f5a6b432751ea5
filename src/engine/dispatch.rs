//! Inbound event dispatch
//!
//! Each inbound event runs a short decision phase under the sender's
//! per-user lock, then executes the decided work outside the lock so slow
//! collaborator calls never serialize a user's other interactions.

use super::{TuneDownloader, render, resolve};
use crate::error::{Error, Result};
use crate::selection::{self, SelectionAction};
use crate::types::{
    ButtonPress, CandidateItem, Event, InboundEvent, LookupResult, MessageRef, ResultSet, Session,
    UserId,
};

const INVALID_SELECTION_NOTICE: &str = "❌ Invalid number. Reply again or send 'discard'.";
const DISCARDED_NOTICE: &str = "🗑 Search discarded.";
const NO_RESULTS_NOTICE: &str = "❌ No results found.";
const LOOKUP_FAILED_NOTICE: &str = "❌ Could not get track information.";
const SEARCH_FAILED_NOTICE: &str = "❌ Search failed. Please try again.";
const PROCESSING_NOTICE: &str = "🔍 Processing...";

/// Work decided under the user lock, executed after releasing it
enum Decision {
    Notify(String),
    ShowPage(usize),
    Fetch(Vec<CandidateItem>),
    Search(String),
    Nothing,
}

impl TuneDownloader {
    /// Dispatch one inbound event from the messaging channel
    pub async fn handle_event(&self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::Text { user, text } => self.handle_text(user, text).await,
            InboundEvent::Button { user, press } => self.handle_button(user, press).await,
        }
    }

    async fn handle_text(&self, user: UserId, text: String) -> Result<()> {
        let page_size = self.config.selection.page_size;

        let decision = {
            let _guard = self.sessions.lock_user(user).await;
            let session = self.sessions.get(user).await;

            match selection::parse_reply(&text, session.as_ref(), page_size) {
                Ok(SelectionAction::Discard) => {
                    self.sessions.clear(user).await;
                    self.emit_event(Event::SessionDiscarded { user });
                    Decision::Notify(DISCARDED_NOTICE.to_string())
                }
                Ok(SelectionAction::AdvancePage) => {
                    match self.sessions.advance_page(user, page_size).await {
                        Some(page) => Decision::ShowPage(page),
                        None => Decision::Nothing,
                    }
                }
                Ok(SelectionAction::RetreatPage) => match self.sessions.retreat_page(user).await {
                    Some(page) => Decision::ShowPage(page),
                    None => Decision::Nothing,
                },
                Ok(SelectionAction::SelectIndices(indices)) => {
                    let session = session.ok_or_else(|| {
                        Error::StoreCorruption("selection parsed without a session".to_string())
                    })?;
                    let items = indices
                        .iter()
                        .filter_map(|&i| session.result_set.items.get(i - 1).cloned())
                        .collect();
                    Decision::Fetch(items)
                }
                Ok(SelectionAction::NewSearch(query)) => Decision::Search(query),
                Err(Error::InvalidSelection { input }) => {
                    tracing::debug!(user = %user, input = %input, "Invalid selection reply");
                    Decision::Notify(INVALID_SELECTION_NOTICE.to_string())
                }
                Err(e) => return Err(e),
            }
        };

        self.execute(user, decision).await
    }

    async fn handle_button(&self, user: UserId, press: ButtonPress) -> Result<()> {
        let page_size = self.config.selection.page_size;

        let decision = {
            let _guard = self.sessions.lock_user(user).await;
            match press {
                ButtonPress::Discard => {
                    self.sessions.clear(user).await;
                    self.emit_event(Event::SessionDiscarded { user });
                    Decision::Notify(DISCARDED_NOTICE.to_string())
                }
                ButtonPress::NextPage => {
                    match self.sessions.advance_page(user, page_size).await {
                        Some(page) => Decision::ShowPage(page),
                        None => Decision::Nothing,
                    }
                }
                ButtonPress::PrevPage => match self.sessions.retreat_page(user).await {
                    Some(page) => Decision::ShowPage(page),
                    None => Decision::Nothing,
                },
            }
        };

        self.execute(user, decision).await
    }

    async fn execute(&self, user: UserId, decision: Decision) -> Result<()> {
        match decision {
            Decision::Notify(text) => {
                self.channel.send_status(user, &text).await?;
                Ok(())
            }
            Decision::ShowPage(page) => self.show_page(user, page).await,
            Decision::Fetch(items) => self.run_batch(user, items).await,
            Decision::Search(query) => self.start_search(user, query).await,
            Decision::Nothing => {
                tracing::debug!(user = %user, "No-op interaction");
                Ok(())
            }
        }
    }

    async fn show_page(&self, user: UserId, page: usize) -> Result<()> {
        let Some(session) = self.sessions.get(user).await else {
            return Ok(());
        };
        let view = crate::pager::page(&session.result_set, page, self.config.selection.page_size)?;
        let text = render::page_text(&session.result_set, &view);
        self.channel.send_status(user, &text).await?;
        self.emit_event(Event::PageShown { user, page });
        Ok(())
    }

    async fn start_search(&self, user: UserId, query: String) -> Result<()> {
        self.emit_event(Event::SearchStarted {
            user,
            query: query.clone(),
        });
        let status = self.channel.send_status(user, PROCESSING_NOTICE).await?;

        match resolve::classify_input(&query, &self.config.media) {
            resolve::ReferenceKind::Track(reference)
            | resolve::ReferenceKind::Collection(reference) => {
                self.start_reference(user, &reference, status).await
            }
            resolve::ReferenceKind::DirectMedia(locator) => {
                let mut candidates = match self.resolver.search(&locator).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        tracing::warn!(user = %user, error = %e, "Locator search failed");
                        self.channel
                            .edit_status(user, status, SEARCH_FAILED_NOTICE)
                            .await?;
                        return Ok(());
                    }
                };
                if candidates.is_empty() {
                    self.channel
                        .edit_status(user, status, NO_RESULTS_NOTICE)
                        .await?;
                    return Ok(());
                }
                let item = candidates.remove(0);
                self.channel
                    .edit_status(user, status, &format!("🎯 {} by {}", item.title, item.uploader))
                    .await?;
                self.run_batch(user, vec![item]).await
            }
            resolve::ReferenceKind::Query(text) => {
                let candidates = match self.resolver.search(&text).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        tracing::warn!(user = %user, error = %e, "Search failed");
                        self.channel
                            .edit_status(user, status, SEARCH_FAILED_NOTICE)
                            .await?;
                        return Ok(());
                    }
                };
                if candidates.is_empty() {
                    self.channel
                        .edit_status(user, status, NO_RESULTS_NOTICE)
                        .await?;
                    return Ok(());
                }
                self.open_session(user, ResultSet::new(candidates, None), status)
                    .await
            }
        }
    }

    /// Handle a streaming-service reference (track or collection link)
    async fn start_reference(
        &self,
        user: UserId,
        reference: &str,
        status: MessageRef,
    ) -> Result<()> {
        let lookup = match self.lookup.lookup(reference).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(user = %user, reference, error = %e, "Metadata lookup failed");
                self.channel
                    .edit_status(user, status, LOOKUP_FAILED_NOTICE)
                    .await?;
                return Ok(());
            }
        };

        match lookup {
            LookupResult::Track(metadata) => {
                self.channel
                    .edit_status(
                        user,
                        status,
                        &format!("🎯 {} by {}", metadata.title, metadata.artist),
                    )
                    .await?;
                self.run_batch(user, vec![CandidateItem::from_track(&metadata)])
                    .await
            }
            LookupResult::Album { name, tracks }
            | LookupResult::Playlist { name, tracks }
            | LookupResult::Artist { name, tracks } => {
                let items: Vec<CandidateItem> =
                    tracks.iter().map(CandidateItem::from_track).collect();
                if items.is_empty() {
                    self.channel
                        .edit_status(user, status, NO_RESULTS_NOTICE)
                        .await?;
                    return Ok(());
                }
                self.open_session(user, ResultSet::new(items, Some(name)), status)
                    .await
            }
        }
    }

    /// Store a fresh session and show its first page
    async fn open_session(
        &self,
        user: UserId,
        result_set: ResultSet,
        status: MessageRef,
    ) -> Result<()> {
        self.emit_event(Event::ResultsReady {
            user,
            count: result_set.len(),
            label: result_set.label.clone(),
        });

        let view = crate::pager::page(&result_set, 0, self.config.selection.page_size)?;
        let text = render::page_text(&result_set, &view);

        self.sessions.put(Session::new(user, result_set)).await;
        self.channel.edit_status(user, status, &text).await?;
        self.emit_event(Event::PageShown { user, page: 0 });
        Ok(())
    }

    /// Fetch the chosen items and deliver the batch
    async fn run_batch(&self, user: UserId, items: Vec<CandidateItem>) -> Result<()> {
        self.channel
            .send_status(user, &format!("⬇️ Fetching {} track(s)...", items.len()))
            .await?;

        let outcomes = self.pipeline.fetch_batch(items).await;
        for outcome in &outcomes {
            let succeeded = outcome.status == crate::types::FetchStatus::Succeeded;
            self.emit_event(Event::ItemFetched {
                user,
                title: outcome.item.title.clone(),
                succeeded,
                attempts: outcome.attempts,
            });
            if !succeeded {
                let notice = format!("❌ Could not fetch `{}`. Skipping.", outcome.item.title);
                if let Err(e) = self.channel.send_status(user, &notice).await {
                    // The remaining outcomes still deliver and get summarized
                    tracing::warn!(user = %user, error = %e, "Could not send failure notice");
                }
            }
        }

        // The sequencer clears the session as its terminal step
        let summary = self.delivery.deliver_batch(user, &outcomes, &self.sessions).await;
        self.emit_event(Event::BatchComplete {
            user,
            delivered: summary.delivered,
            fetch_failed: summary.fetch_failed,
            delivery_failed: summary.delivery_failed,
        });
        Ok(())
    }
}
