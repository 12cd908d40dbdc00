mod apply;
mod policy;
mod service;
mod sync;

pub use apply::FolderSuggestionApplier;
pub use policy::{
    EntitlementReader, IneligibleReason, PromptEligibility, SharedEntitlementReader,
    StaticEntitlement, Subscription, SubscriptionPlatform, SubscriptionTier,
    SuggestionPromptPolicy,
};
pub use service::{
    FolderSuggestion, ServerSuggestionService, SuggestionService, group_suggested_folders,
    to_suggested_folders,
};
pub use sync::{FolderSuggestionSync, RefreshOutcome, subscriptions_hash};
