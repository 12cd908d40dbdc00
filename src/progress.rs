use std::sync::Arc;

/// Events emitted while organizing folders, for progress and outcome reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizerEvent {
    /// Subscriptions match the last successful refresh, nothing requested
    SuggestionsUnchanged { subscribed: usize },

    /// Subscriptions changed, the suggestion service is being asked
    SuggestionsRequested { subscribed: usize },

    /// New suggestions replaced the previous ones
    SuggestionsRefreshed {
        /// Distinct folder names suggested
        folders: usize,
        /// Podcast rows across all suggested folders
        podcasts: usize,
    },

    /// The suggestion service failed; previous suggestions are kept
    SuggestionsFailed { error: String },

    /// A folder was created from an accepted suggestion
    FolderCreated {
        folder_id: String,
        name: String,
        podcasts: usize,
    },

    /// Accepted suggestions were committed and the suggestion table cleared
    SuggestionsApplied { folders: usize, podcasts: usize },
}

/// Trait for reporting organizer events.
///
/// Implementations can use this to drive UI state, log messages,
/// or collect statistics.
pub trait EventReporter: Send + Sync {
    /// Report an event
    fn report(&self, event: OrganizerEvent);
}

/// A shared reference to an event reporter
pub type SharedEventReporter = Arc<dyn EventReporter>;

/// A no-op reporter that silently ignores all events.
/// Useful for tests or headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl EventReporter for NoopReporter {
    fn report(&self, _event: OrganizerEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedEventReporter {
        Arc::new(Self)
    }
}
