// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which podcasts a smart playlist draws episodes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodcastsRule {
    /// Every subscribed podcast
    All,
    /// Only the listed podcast ids
    Selected(BTreeSet<String>),
}

/// Playing statuses an episode may have to be included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStatusRule {
    pub unplayed: bool,
    pub in_progress: bool,
    pub completed: bool,
}

impl EpisodeStatusRule {
    /// True when at least one status is accepted
    pub fn accepts_any(&self) -> bool {
        self.unplayed || self.in_progress || self.completed
    }
}

/// Publish-date window, measured back from the evaluation instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseDateRule {
    AnyTime,
    Last24Hours,
    Last3Days,
    LastWeek,
    Last2Weeks,
    LastMonth,
}

impl ReleaseDateRule {
    /// Length of the window, `None` for no constraint
    pub fn window(&self) -> Option<chrono::Duration> {
        match self {
            ReleaseDateRule::AnyTime => None,
            ReleaseDateRule::Last24Hours => Some(chrono::Duration::hours(24)),
            ReleaseDateRule::Last3Days => Some(chrono::Duration::days(3)),
            ReleaseDateRule::LastWeek => Some(chrono::Duration::weeks(1)),
            ReleaseDateRule::Last2Weeks => Some(chrono::Duration::weeks(2)),
            ReleaseDateRule::LastMonth => Some(chrono::Duration::days(31)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeDurationRule {
    Any,
    /// Inclusive bounds
    Constrained { min: Duration, max: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatusRule {
    Any,
    Downloaded,
    NotDownloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaTypeRule {
    Any,
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarredRule {
    Any,
    Starred,
}

/// Complete description of a smart playlist.
///
/// Every sub-rule must hold for an episode to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub podcasts: PodcastsRule,
    pub episode_status: EpisodeStatusRule,
    pub release_date: ReleaseDateRule,
    pub episode_duration: EpisodeDurationRule,
    pub download_status: DownloadStatusRule,
    pub media_type: MediaTypeRule,
    pub starred: StarredRule,
}

impl RuleSet {
    pub const DEFAULT: RuleSet = RuleSet {
        podcasts: PodcastsRule::All,
        episode_status: EpisodeStatusRule {
            unplayed: true,
            in_progress: true,
            completed: false,
        },
        release_date: ReleaseDateRule::AnyTime,
        episode_duration: EpisodeDurationRule::Any,
        download_status: DownloadStatusRule::Any,
        media_type: MediaTypeRule::Any,
        starred: StarredRule::Any,
    };

    /// Whether any episode could possibly satisfy these rules.
    ///
    /// False when every status flag is off or the duration bounds are
    /// inverted. Callers show a guidance state instead of an empty list.
    pub fn is_satisfiable(&self) -> bool {
        let duration_ok = match self.episode_duration {
            EpisodeDurationRule::Any => true,
            EpisodeDurationRule::Constrained { min, max } => min <= max,
        };
        self.episode_status.accepts_any() && duration_ok
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_satisfiable() {
        assert!(RuleSet::default().is_satisfiable());
    }

    #[test]
    fn all_statuses_off_is_unsatisfiable() {
        let rules = RuleSet {
            episode_status: EpisodeStatusRule {
                unplayed: false,
                in_progress: false,
                completed: false,
            },
            ..RuleSet::DEFAULT
        };

        assert!(!rules.is_satisfiable());
    }

    #[test]
    fn inverted_duration_bounds_are_unsatisfiable() {
        let rules = RuleSet {
            episode_duration: EpisodeDurationRule::Constrained {
                min: Duration::from_secs(40 * 60),
                max: Duration::from_secs(20 * 60),
            },
            ..RuleSet::DEFAULT
        };

        assert!(!rules.is_satisfiable());
    }

    #[test]
    fn release_windows_grow_monotonically() {
        let windows: Vec<_> = [
            ReleaseDateRule::Last24Hours,
            ReleaseDateRule::Last3Days,
            ReleaseDateRule::LastWeek,
            ReleaseDateRule::Last2Weeks,
            ReleaseDateRule::LastMonth,
        ]
        .iter()
        .filter_map(|rule| rule.window())
        .collect();

        assert_eq!(windows.len(), 5);
        assert!(windows.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(ReleaseDateRule::AnyTime.window().is_none());
    }
}
