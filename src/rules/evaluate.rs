// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{Episode, PlayingStatus, Podcast};

use super::types::{
    DownloadStatusRule, EpisodeDurationRule, EpisodeStatusRule, MediaTypeRule, PodcastsRule,
    ReleaseDateRule, RuleSet, StarredRule,
};

/// Ordering of a smart playlist's episodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodeSortType {
    #[default]
    NewestToOldest,
    OldestToNewest,
    ShortestToLongest,
    LongestToShortest,
}

impl PodcastsRule {
    fn accepts(&self, podcast_id: &str) -> bool {
        match self {
            PodcastsRule::All => true,
            PodcastsRule::Selected(ids) => ids.contains(podcast_id),
        }
    }
}

impl EpisodeStatusRule {
    fn accepts(&self, status: PlayingStatus) -> bool {
        match status {
            PlayingStatus::NotPlayed => self.unplayed,
            PlayingStatus::InProgress => self.in_progress,
            PlayingStatus::Completed => self.completed,
        }
    }
}

impl ReleaseDateRule {
    fn accepts(&self, published: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.window() {
            None => true,
            Some(window) => published >= now - window && published <= now,
        }
    }
}

impl EpisodeDurationRule {
    fn accepts(&self, episode: &Episode) -> bool {
        match self {
            EpisodeDurationRule::Any => true,
            EpisodeDurationRule::Constrained { min, max } => {
                episode.duration >= *min && episode.duration <= *max
            }
        }
    }
}

impl DownloadStatusRule {
    fn accepts(&self, downloaded: bool) -> bool {
        match self {
            DownloadStatusRule::Any => true,
            DownloadStatusRule::Downloaded => downloaded,
            DownloadStatusRule::NotDownloaded => !downloaded,
        }
    }
}

impl MediaTypeRule {
    fn accepts(&self, episode: &Episode) -> bool {
        match self {
            MediaTypeRule::Any => true,
            MediaTypeRule::Audio => !episode.is_video(),
            MediaTypeRule::Video => episode.is_video(),
        }
    }
}

impl StarredRule {
    fn accepts(&self, starred: bool) -> bool {
        match self {
            StarredRule::Any => true,
            StarredRule::Starred => starred,
        }
    }
}

impl RuleSet {
    /// Whether `episode` of `podcast` matches at instant `now`.
    ///
    /// Episodes of unsubscribed podcasts never match.
    pub fn matches(&self, episode: &Episode, podcast: &Podcast, now: DateTime<Utc>) -> bool {
        podcast.subscribed
            && episode.podcast_id == podcast.id
            && self.podcasts.accepts(&podcast.id)
            && self.episode_status.accepts(episode.playing_status)
            && self.release_date.accepts(episode.published, now)
            && self.episode_duration.accepts(episode)
            && self.download_status.accepts(episode.downloaded)
            && self.media_type.accepts(episode)
            && self.starred.accepts(episode.starred)
    }
}

/// Select and order the episodes matching `rules`
pub fn select_matches<'a>(
    rules: &RuleSet,
    podcasts: impl IntoIterator<Item = &'a Podcast>,
    episodes: impl IntoIterator<Item = &'a Episode>,
    now: DateTime<Utc>,
    sort_type: EpisodeSortType,
) -> Vec<Episode> {
    if !rules.is_satisfiable() {
        return Vec::new();
    }

    let podcasts: HashMap<&str, &Podcast> = podcasts
        .into_iter()
        .map(|podcast| (podcast.id.as_str(), podcast))
        .collect();

    let mut matches: Vec<Episode> = episodes
        .into_iter()
        .filter(|episode| {
            podcasts
                .get(episode.podcast_id.as_str())
                .is_some_and(|podcast| rules.matches(episode, podcast, now))
        })
        .cloned()
        .collect();

    match sort_type {
        EpisodeSortType::NewestToOldest => matches.sort_by_key(|e| Reverse(e.published)),
        EpisodeSortType::OldestToNewest => matches.sort_by_key(|e| e.published),
        EpisodeSortType::ShortestToLongest => matches.sort_by_key(|e| e.duration),
        EpisodeSortType::LongestToShortest => matches.sort_by_key(|e| Reverse(e.duration)),
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;

    use crate::rules::duration::from_minutes;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_podcast(id: &str) -> Podcast {
        Podcast::new(id, format!("Podcast {id}"), now() - Duration::days(100))
    }

    fn make_episode(id: &str, podcast_id: &str, age: Duration) -> Episode {
        let mut episode = Episode::new(id, podcast_id, format!("Episode {id}"), now() - age);
        episode.duration = from_minutes(30);
        episode
    }

    fn matching_ids(rules: &RuleSet, podcasts: &[Podcast], episodes: &[Episode]) -> Vec<String> {
        select_matches(rules, podcasts, episodes, now(), EpisodeSortType::NewestToOldest)
            .into_iter()
            .map(|episode| episode.id)
            .collect()
    }

    #[test]
    fn selected_podcasts_restrict_matches() {
        let podcasts = vec![make_podcast("a"), make_podcast("b")];
        let episodes = vec![
            make_episode("a1", "a", Duration::hours(1)),
            make_episode("b1", "b", Duration::hours(2)),
        ];
        let rules = RuleSet {
            podcasts: PodcastsRule::Selected(BTreeSet::from(["b".to_string()])),
            ..RuleSet::DEFAULT
        };

        assert_eq!(matching_ids(&rules, &podcasts, &episodes), vec!["b1"]);
    }

    #[test]
    fn unsubscribed_podcasts_never_match() {
        let mut podcast = make_podcast("a");
        podcast.subscribed = false;
        let episodes = vec![make_episode("a1", "a", Duration::hours(1))];

        assert!(matching_ids(&RuleSet::DEFAULT, &[podcast], &episodes).is_empty());
    }

    #[test]
    fn status_flags_select_any_matching_status() {
        let podcasts = vec![make_podcast("a")];
        let mut played = make_episode("done", "a", Duration::hours(1));
        played.playing_status = PlayingStatus::Completed;
        let mut partial = make_episode("partial", "a", Duration::hours(2));
        partial.playing_status = PlayingStatus::InProgress;
        let fresh = make_episode("fresh", "a", Duration::hours(3));
        let episodes = vec![played, partial, fresh];

        let rules = RuleSet {
            episode_status: EpisodeStatusRule {
                unplayed: false,
                in_progress: true,
                completed: true,
            },
            ..RuleSet::DEFAULT
        };

        assert_eq!(
            matching_ids(&rules, &podcasts, &episodes),
            vec!["done", "partial"]
        );
    }

    #[test]
    fn all_status_flags_off_yields_nothing() {
        let podcasts = vec![make_podcast("a")];
        let episodes = vec![make_episode("a1", "a", Duration::hours(1))];
        let rules = RuleSet {
            episode_status: EpisodeStatusRule {
                unplayed: false,
                in_progress: false,
                completed: false,
            },
            ..RuleSet::DEFAULT
        };

        assert!(matching_ids(&rules, &podcasts, &episodes).is_empty());
    }

    #[test]
    fn release_window_is_inclusive_and_excludes_future() {
        let podcasts = vec![make_podcast("a")];
        let episodes = vec![
            make_episode("edge", "a", Duration::hours(24)),
            make_episode("old", "a", Duration::hours(25)),
            make_episode("future", "a", Duration::hours(-1)),
        ];
        let rules = RuleSet {
            release_date: ReleaseDateRule::Last24Hours,
            ..RuleSet::DEFAULT
        };

        assert_eq!(matching_ids(&rules, &podcasts, &episodes), vec!["edge"]);
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        let podcasts = vec![make_podcast("a")];
        let mut short = make_episode("short", "a", Duration::hours(1));
        short.duration = from_minutes(10);
        let mut long = make_episode("long", "a", Duration::hours(2));
        long.duration = from_minutes(41);
        let mut exact = make_episode("exact", "a", Duration::hours(3));
        exact.duration = from_minutes(20);
        let episodes = vec![short, long, exact];

        let rules = RuleSet {
            episode_duration: EpisodeDurationRule::Constrained {
                min: from_minutes(20),
                max: from_minutes(40),
            },
            ..RuleSet::DEFAULT
        };

        assert_eq!(matching_ids(&rules, &podcasts, &episodes), vec!["exact"]);
    }

    #[test]
    fn download_media_and_starred_rules() {
        let podcasts = vec![make_podcast("a")];
        let mut video = make_episode("video", "a", Duration::hours(1));
        video.file_type = Some("video/mp4".to_string());
        video.downloaded = true;
        video.starred = true;
        let audio = make_episode("audio", "a", Duration::hours(2));
        let episodes = vec![video, audio];

        let downloaded = RuleSet {
            download_status: DownloadStatusRule::Downloaded,
            ..RuleSet::DEFAULT
        };
        assert_eq!(matching_ids(&downloaded, &podcasts, &episodes), vec!["video"]);

        let not_downloaded = RuleSet {
            download_status: DownloadStatusRule::NotDownloaded,
            ..RuleSet::DEFAULT
        };
        assert_eq!(matching_ids(&not_downloaded, &podcasts, &episodes), vec!["audio"]);

        let audio_only = RuleSet {
            media_type: MediaTypeRule::Audio,
            ..RuleSet::DEFAULT
        };
        assert_eq!(matching_ids(&audio_only, &podcasts, &episodes), vec!["audio"]);

        let starred = RuleSet {
            starred: StarredRule::Starred,
            ..RuleSet::DEFAULT
        };
        assert_eq!(matching_ids(&starred, &podcasts, &episodes), vec!["video"]);
    }

    #[test]
    fn sort_types_order_results() {
        let podcasts = vec![make_podcast("a")];
        let mut newer = make_episode("newer", "a", Duration::hours(1));
        newer.duration = from_minutes(50);
        let mut older = make_episode("older", "a", Duration::hours(5));
        older.duration = from_minutes(10);
        let episodes = vec![older, newer];

        let ids = |sort| {
            select_matches(&RuleSet::DEFAULT, &podcasts, &episodes, now(), sort)
                .into_iter()
                .map(|episode| episode.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(EpisodeSortType::NewestToOldest), vec!["newer", "older"]);
        assert_eq!(ids(EpisodeSortType::OldestToNewest), vec!["older", "newer"]);
        assert_eq!(ids(EpisodeSortType::ShortestToLongest), vec!["older", "newer"]);
        assert_eq!(ids(EpisodeSortType::LongestToShortest), vec!["newer", "older"]);
    }
}
