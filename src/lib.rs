pub mod clock;
pub mod config;
pub mod error;
pub mod folders;
pub mod http;
pub mod library;
pub mod observe;
pub mod playlist;
pub mod progress;
pub mod rules;
pub mod settings;
pub mod suggestion;

// Re-export main types for convenience
pub use clock::{
    Clock, FixedClock, IdGenerator, SequentialIdGenerator, SharedClock, SharedIdGenerator,
    SystemClock, UuidGenerator,
};
pub use config::OrganizerOptions;
pub use error::{
    ConfigError, OrganizerError, SettingsError, SnapshotError, StoreError, SuggestionError,
};
pub use folders::{FolderItem, FolderManager, PodcastFolder, PodcastsSortType};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use library::{
    Episode, Folder, Library, PlayingStatus, Podcast, SuggestedFolder, SyncStatus, load_snapshot,
    save_snapshot,
};
pub use observe::{EpisodeRuleEvaluator, MatchSubscription};
pub use playlist::{SmartPlaylist, SmartPlaylistDraft, SmartPlaylists};
pub use progress::{EventReporter, NoopReporter, OrganizerEvent, SharedEventReporter};
pub use rules::{EpisodeSortType, RuleBuilder, RuleSet};
pub use settings::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore};
pub use suggestion::{
    FolderSuggestion, FolderSuggestionApplier, FolderSuggestionSync, PromptEligibility,
    RefreshOutcome, ServerSuggestionService, SuggestionPromptPolicy, SuggestionService,
};
