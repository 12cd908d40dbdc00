mod builder;
pub mod duration;
mod evaluate;
mod types;

pub use builder::RuleBuilder;
pub use duration::{BREAKPOINT_MINUTES, step_down, step_up};
pub use evaluate::{EpisodeSortType, select_matches};
pub use types::{
    DownloadStatusRule, EpisodeDurationRule, EpisodeStatusRule, MediaTypeRule, PodcastsRule,
    ReleaseDateRule, RuleSet, StarredRule,
};
