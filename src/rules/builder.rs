// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::time::Duration;

use super::duration::{from_minutes, step_duration_down, step_duration_up};
use super::types::{
    DownloadStatusRule, EpisodeDurationRule, EpisodeStatusRule, MediaTypeRule, PodcastsRule,
    ReleaseDateRule, RuleSet, StarredRule,
};

/// Editable projection of a [`RuleSet`] as the rule editor presents it.
///
/// Every method returns a new builder. Duration bounds are remembered while
/// the duration constraint is switched off, so toggling it back on restores
/// the last chosen values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBuilder {
    pub use_all_podcasts: bool,
    pub selected_podcasts: BTreeSet<String>,
    pub episode_status_rule: EpisodeStatusRule,
    pub release_date_rule: ReleaseDateRule,
    pub is_episode_duration_constrained: bool,
    pub min_episode_duration: Duration,
    pub max_episode_duration: Duration,
    pub download_status_rule: DownloadStatusRule,
    pub media_type_rule: MediaTypeRule,
    pub use_starred_episodes: bool,
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::empty()
    }
}

impl RuleBuilder {
    /// Builder for a fresh playlist
    pub fn empty() -> Self {
        Self {
            use_all_podcasts: true,
            selected_podcasts: BTreeSet::new(),
            episode_status_rule: RuleSet::DEFAULT.episode_status,
            release_date_rule: RuleSet::DEFAULT.release_date,
            is_episode_duration_constrained: false,
            min_episode_duration: from_minutes(20),
            max_episode_duration: from_minutes(40),
            download_status_rule: RuleSet::DEFAULT.download_status,
            media_type_rule: RuleSet::DEFAULT.media_type,
            use_starred_episodes: false,
        }
    }

    /// Load `rules` into the builder.
    ///
    /// The current podcast selection survives unless `rules` selects
    /// podcasts itself. An unconstrained duration rule keeps the remembered
    /// bounds.
    #[must_use]
    pub fn apply_rules(&self, rules: &RuleSet) -> Self {
        let (use_all_podcasts, selected_podcasts) = match &rules.podcasts {
            PodcastsRule::All => (true, self.selected_podcasts.clone()),
            PodcastsRule::Selected(ids) => (false, ids.clone()),
        };
        let (is_constrained, min, max) = match rules.episode_duration {
            EpisodeDurationRule::Any => (
                false,
                self.min_episode_duration,
                self.max_episode_duration,
            ),
            EpisodeDurationRule::Constrained { min, max } => (true, min, max),
        };

        Self {
            use_all_podcasts,
            selected_podcasts,
            episode_status_rule: rules.episode_status,
            release_date_rule: rules.release_date,
            is_episode_duration_constrained: is_constrained,
            min_episode_duration: min,
            max_episode_duration: max,
            download_status_rule: rules.download_status,
            media_type_rule: rules.media_type,
            use_starred_episodes: rules.starred == StarredRule::Starred,
        }
    }

    pub fn podcasts_rule(&self) -> PodcastsRule {
        if self.use_all_podcasts {
            PodcastsRule::All
        } else {
            PodcastsRule::Selected(self.selected_podcasts.clone())
        }
    }

    pub fn episode_duration_rule(&self) -> EpisodeDurationRule {
        if self.is_episode_duration_constrained {
            EpisodeDurationRule::Constrained {
                min: self.min_episode_duration,
                max: self.max_episode_duration,
            }
        } else {
            EpisodeDurationRule::Any
        }
    }

    pub fn starred_rule(&self) -> StarredRule {
        if self.use_starred_episodes {
            StarredRule::Starred
        } else {
            StarredRule::Any
        }
    }

    pub fn to_rule_set(&self) -> RuleSet {
        RuleSet {
            podcasts: self.podcasts_rule(),
            episode_status: self.episode_status_rule,
            release_date: self.release_date_rule,
            episode_duration: self.episode_duration_rule(),
            download_status: self.download_status_rule,
            media_type: self.media_type_rule,
            starred: self.starred_rule(),
        }
    }

    #[must_use]
    pub fn use_all_podcasts(&self, use_all: bool) -> Self {
        Self {
            use_all_podcasts: use_all,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn select_podcast(&self, id: &str) -> Self {
        let mut selected = self.selected_podcasts.clone();
        selected.insert(id.to_string());
        Self {
            selected_podcasts: selected,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn deselect_podcast(&self, id: &str) -> Self {
        let mut selected = self.selected_podcasts.clone();
        selected.remove(id);
        Self {
            selected_podcasts: selected,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn select_all_podcasts<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected_podcasts: ids.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn deselect_all_podcasts(&self) -> Self {
        Self {
            selected_podcasts: BTreeSet::new(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn use_unplayed_episodes(&self, used: bool) -> Self {
        self.with_status(EpisodeStatusRule {
            unplayed: used,
            ..self.episode_status_rule
        })
    }

    #[must_use]
    pub fn use_in_progress_episodes(&self, used: bool) -> Self {
        self.with_status(EpisodeStatusRule {
            in_progress: used,
            ..self.episode_status_rule
        })
    }

    #[must_use]
    pub fn use_completed_episodes(&self, used: bool) -> Self {
        self.with_status(EpisodeStatusRule {
            completed: used,
            ..self.episode_status_rule
        })
    }

    fn with_status(&self, rule: EpisodeStatusRule) -> Self {
        Self {
            episode_status_rule: rule,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn use_release_date(&self, rule: ReleaseDateRule) -> Self {
        Self {
            release_date_rule: rule,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn constrain_duration(&self, constrained: bool) -> Self {
        Self {
            is_episode_duration_constrained: constrained,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn use_download_status(&self, rule: DownloadStatusRule) -> Self {
        Self {
            download_status_rule: rule,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn use_media_type(&self, rule: MediaTypeRule) -> Self {
        Self {
            media_type_rule: rule,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn use_starred_episodes(&self, starred: bool) -> Self {
        Self {
            use_starred_episodes: starred,
            ..self.clone()
        }
    }

    // The minimum must stay strictly below the maximum, and the maximum
    // strictly above both zero and the minimum. A step that would break
    // either bound leaves the builder as it was.

    #[must_use]
    pub fn increment_min_duration(&self) -> Self {
        self.with_min(step_duration_up(self.min_episode_duration))
    }

    #[must_use]
    pub fn decrement_min_duration(&self) -> Self {
        self.with_min(step_duration_down(self.min_episode_duration))
    }

    #[must_use]
    pub fn increment_max_duration(&self) -> Self {
        self.with_max(step_duration_up(self.max_episode_duration))
    }

    #[must_use]
    pub fn decrement_max_duration(&self) -> Self {
        self.with_max(step_duration_down(self.max_episode_duration))
    }

    fn with_min(&self, min: Duration) -> Self {
        if min < self.max_episode_duration {
            Self {
                min_episode_duration: min,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    fn with_max(&self, max: Duration) -> Self {
        if max > Duration::ZERO && max > self.min_episode_duration {
            Self {
                max_episode_duration: max,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }
}
