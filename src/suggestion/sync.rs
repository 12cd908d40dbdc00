// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::OrganizerError;
use crate::library::Library;
use crate::progress::{OrganizerEvent, SharedEventReporter};
use crate::settings::SharedSettingsStore;

use super::service::{SuggestionService, to_suggested_folders};

/// Result of a suggestion refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Subscriptions match the last successful refresh
    Unchanged,
    /// The suggestion table was replaced
    Refreshed { folders: usize, podcasts: usize },
    /// The refresh failed and stored state was left untouched
    Failed,
}

/// Stable fingerprint of a set of podcast ids, independent of their order
pub fn subscriptions_hash(podcast_ids: &[String]) -> String {
    let mut sorted: Vec<&str> = podcast_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(sorted.join(",").as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Keeps the suggested folder table in step with the user's subscriptions
pub struct FolderSuggestionSync<S: SuggestionService> {
    service: S,
    library: Arc<Library>,
    settings: SharedSettingsStore,
    reporter: SharedEventReporter,
}

impl<S: SuggestionService> FolderSuggestionSync<S> {
    pub fn new(
        service: S,
        library: Arc<Library>,
        settings: SharedSettingsStore,
        reporter: SharedEventReporter,
    ) -> Self {
        Self {
            service,
            library,
            settings,
            reporter,
        }
    }

    /// Ask the service for new suggestions if subscriptions changed since
    /// the last successful refresh.
    ///
    /// Never fails: any error is logged, reported and turned into
    /// [`RefreshOutcome::Failed`], leaving previous suggestions and the
    /// stored hash as they were.
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.try_refresh().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Folder suggestion refresh failed");
                self.reporter.report(OrganizerEvent::SuggestionsFailed {
                    error: e.to_string(),
                });
                RefreshOutcome::Failed
            }
        }
    }

    async fn try_refresh(&self) -> Result<RefreshOutcome, OrganizerError> {
        let podcast_ids = self.library.subscribed_podcast_ids()?;
        let hash = subscriptions_hash(&podcast_ids);

        let settings = self.settings.load()?;
        if settings.suggested_folders_hash.as_deref() == Some(hash.as_str()) {
            debug!(subscribed = podcast_ids.len(), "Subscriptions unchanged");
            self.reporter.report(OrganizerEvent::SuggestionsUnchanged {
                subscribed: podcast_ids.len(),
            });
            return Ok(RefreshOutcome::Unchanged);
        }

        // Nothing to organize; stale suggestions go without a round trip
        let suggestions = if podcast_ids.is_empty() {
            Vec::new()
        } else {
            self.reporter.report(OrganizerEvent::SuggestionsRequested {
                subscribed: podcast_ids.len(),
            });
            self.service.get_suggestions(&podcast_ids).await?
        };

        let rows = to_suggested_folders(&suggestions);
        let podcasts = rows.len();
        self.library.replace_suggested_folders(rows)?;

        let mut settings = self.settings.load()?;
        settings.suggested_folders_hash = Some(hash);
        self.settings.save(&settings)?;

        info!(
            folders = suggestions.len(),
            podcasts, "Folder suggestions refreshed"
        );
        self.reporter.report(OrganizerEvent::SuggestionsRefreshed {
            folders: suggestions.len(),
            podcasts,
        });

        Ok(RefreshOutcome::Refreshed {
            folders: suggestions.len(),
            podcasts,
        })
    }
}
