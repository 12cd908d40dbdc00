// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::clock::SharedClock;
use crate::library::{Episode, Library};
use crate::rules::{EpisodeSortType, RuleSet, select_matches};

/// Runs smart playlist rules against the library
#[derive(Clone)]
pub struct EpisodeRuleEvaluator {
    library: Arc<Library>,
    clock: SharedClock,
}

impl EpisodeRuleEvaluator {
    pub fn new(library: Arc<Library>, clock: SharedClock) -> Self {
        Self { library, clock }
    }

    /// One-off evaluation. A failed store read yields no matches.
    pub fn evaluate(&self, rules: &RuleSet, sort_type: EpisodeSortType) -> Vec<Episode> {
        let now = self.clock.now();
        let result = self.library.with_podcasts_and_episodes(|podcasts, episodes| {
            select_matches(rules, podcasts.values(), episodes.values(), now, sort_type)
        });
        match result {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Smart playlist evaluation failed");
                Vec::new()
            }
        }
    }

    /// Live matches for `rules`, newest first. See [`Self::observe_matches_sorted`].
    pub fn observe_matches(&self, rules: RuleSet) -> MatchSubscription {
        self.observe_matches_sorted(rules, EpisodeSortType::default())
    }

    /// Emit the current matches, then a fresh result after every podcast or
    /// episode change, until the subscription is cancelled or dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe_matches_sorted(
        &self,
        rules: RuleSet,
        sort_type: EpisodeSortType,
    ) -> MatchSubscription {
        let (sender, receiver) = mpsc::channel(1);
        let mut changes = self.library.changes();
        let evaluator = self.clone();

        let task = tokio::spawn(async move {
            loop {
                let matches = evaluator.evaluate(&rules, sort_type);
                trace!(matches = matches.len(), "Smart playlist re-evaluated");
                if sender.send(matches).await.is_err() {
                    break;
                }

                tokio::select! {
                    _ = sender.closed() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        MatchSubscription { receiver, task }
    }
}

/// Handle to a live match query. Dropping it stops the query.
#[derive(Debug)]
pub struct MatchSubscription {
    receiver: mpsc::Receiver<Vec<Episode>>,
    task: JoinHandle<()>,
}

impl MatchSubscription {
    /// Wait for the next result; `None` once the query has stopped
    pub async fn next(&mut self) -> Option<Vec<Episode>> {
        self.receiver.recv().await
    }

    /// Stop the query. No result is delivered afterwards.
    pub fn cancel(self) {
        drop(self);
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Episode>> {
        futures::stream::unfold(self, |mut subscription| async move {
            let next = subscription.next().await?;
            Some((next, subscription))
        })
    }
}

impl Drop for MatchSubscription {
    fn drop(&mut self) {
        self.receiver.close();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use futures::StreamExt;

    use crate::clock::FixedClock;
    use crate::library::{Episode, PlayingStatus, Podcast};

    fn setup() -> (EpisodeRuleEvaluator, Arc<Library>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let library = Arc::new(Library::new());
        library
            .upsert_podcast(Podcast::new("daily", "The Daily", now))
            .unwrap();
        library
            .upsert_episode(Episode::new("e1", "daily", "Monday", now))
            .unwrap();
        let evaluator = EpisodeRuleEvaluator::new(library.clone(), Arc::new(FixedClock::new(now)));
        (evaluator, library)
    }

    fn ids(episodes: &[Episode]) -> Vec<&str> {
        episodes.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn emits_initial_matches() {
        let (evaluator, _library) = setup();

        let mut subscription = evaluator.observe_matches(RuleSet::DEFAULT);
        let first = subscription.next().await.unwrap();

        assert_eq!(ids(&first), vec!["e1"]);
    }

    #[tokio::test]
    async fn re_emits_after_library_change() {
        let (evaluator, library) = setup();
        let mut subscription = evaluator.observe_matches(RuleSet::DEFAULT);
        subscription.next().await.unwrap();

        library
            .update_episode("e1", |e| e.playing_status = PlayingStatus::Completed)
            .unwrap();

        let next = tokio::time::timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert!(next.is_empty());
    }

    #[tokio::test]
    async fn unsubscribing_podcast_removes_its_episodes() {
        let (evaluator, library) = setup();
        let mut stream = Box::pin(evaluator.observe_matches(RuleSet::DEFAULT).into_stream());
        assert_eq!(stream.next().await.unwrap().len(), 1);

        library.set_subscribed("daily", false).unwrap();

        let next = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert!(next.is_empty());
    }

    #[tokio::test]
    async fn cancel_stops_the_query() {
        let (evaluator, library) = setup();
        let mut subscription = evaluator.observe_matches(RuleSet::DEFAULT);
        subscription.next().await.unwrap();
        let handle = subscription.task.abort_handle();
        subscription.cancel();

        library
            .upsert_episode(Episode::new("e2", "daily", "Tuesday", Utc::now()))
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    fn poison(library: &Library) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = library.update_episode("e1", |_| panic!("writer died mid-update"));
        }));
        assert!(result.is_err());
    }

    #[test]
    fn evaluate_on_poisoned_library_is_empty() {
        let (evaluator, library) = setup();
        poison(&library);

        let matches = evaluator.evaluate(&RuleSet::DEFAULT, EpisodeSortType::NewestToOldest);

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn subscription_on_poisoned_library_emits_empty_and_stays_open() {
        let (evaluator, library) = setup();
        poison(&library);

        let mut subscription = evaluator.observe_matches(RuleSet::DEFAULT);
        let first = tokio::time::timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap()
            .unwrap();

        assert!(first.is_empty());
        assert!(!subscription.task.is_finished());
    }

    #[test]
    fn evaluate_without_runtime_returns_matches() {
        let (evaluator, _library) = setup();
        let matches = evaluator.evaluate(&RuleSet::DEFAULT, EpisodeSortType::NewestToOldest);
        assert_eq!(ids(&matches), vec!["e1"]);
    }
}
