// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{Folder, Podcast};

/// How podcasts are ordered inside a folder or on the podcasts screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PodcastsSortType {
    NameAToZ,
    #[default]
    DateAddedOldestToNewest,
    EpisodeDateNewestToOldest,
    DragDrop,
}

/// A podcast paired with the folder it currently lives in, if that folder exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastFolder {
    pub podcast: Podcast,
    pub folder: Option<Folder>,
}

/// One entry of the top-level podcasts screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderItem {
    Folder(Folder),
    Podcast(Podcast),
}

impl FolderItem {
    pub fn title(&self) -> &str {
        match self {
            FolderItem::Folder(folder) => &folder.name,
            FolderItem::Podcast(podcast) => &podcast.title,
        }
    }

    pub fn added_date(&self) -> DateTime<Utc> {
        match self {
            FolderItem::Folder(folder) => folder.added_date,
            FolderItem::Podcast(podcast) => podcast.added_date,
        }
    }

    pub fn sort_position(&self) -> i32 {
        match self {
            FolderItem::Folder(folder) => folder.sort_position,
            FolderItem::Podcast(podcast) => podcast.sort_position,
        }
    }
}

/// Merge folders and subscribed podcasts into the top-level list.
///
/// Podcasts inside one of `folders` are represented by their folder; the
/// rest stand on their own. Under [`PodcastsSortType::EpisodeDateNewestToOldest`]
/// each folder takes the slot of its newest podcast and folders without
/// podcasts go last. Every other sort type orders folders and podcasts
/// together by name, added date or drag-drop position.
pub fn build_home_items(
    sort_type: PodcastsSortType,
    mut podcasts: Vec<Podcast>,
    folders: Vec<Folder>,
) -> Vec<FolderItem> {
    let is_live = |podcast: &Podcast| {
        podcast
            .folder_id
            .as_deref()
            .is_some_and(|id| folders.iter().any(|folder| folder.id == id))
    };

    if sort_type == PodcastsSortType::EpisodeDateNewestToOldest {
        podcasts.sort_by_key(|podcast| Reverse(podcast.latest_episode_date));

        let mut pending: Vec<Option<Folder>> = folders.iter().cloned().map(Some).collect();
        let mut items = Vec::with_capacity(podcasts.len() + folders.len());
        for podcast in podcasts {
            if !is_live(&podcast) {
                items.push(FolderItem::Podcast(podcast));
                continue;
            }
            let folder_id = podcast.folder_id.as_deref();
            let slot = pending.iter_mut().find(|slot| {
                slot.as_ref()
                    .is_some_and(|folder| folder_id == Some(folder.id.as_str()))
            });
            if let Some(folder) = slot.and_then(Option::take) {
                items.push(FolderItem::Folder(folder));
            }
        }
        items.extend(pending.into_iter().flatten().map(FolderItem::Folder));
        return items;
    }

    let mut items: Vec<FolderItem> = podcasts
        .into_iter()
        .filter(|podcast| !is_live(podcast))
        .map(FolderItem::Podcast)
        .collect();
    items.extend(folders.into_iter().map(FolderItem::Folder));

    match sort_type {
        PodcastsSortType::NameAToZ => {
            items.sort_by_cached_key(|item| clean_string_for_sort(item.title()))
        }
        PodcastsSortType::DateAddedOldestToNewest => items.sort_by_key(FolderItem::added_date),
        PodcastsSortType::DragDrop => items.sort_by_key(FolderItem::sort_position),
        PodcastsSortType::EpisodeDateNewestToOldest => {}
    }
    items
}

/// Collation key for titles: lower-cased with a leading "the " dropped
pub fn clean_string_for_sort(title: &str) -> String {
    let lower = title.to_lowercase();
    match lower.strip_prefix("the ") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Keep podcasts whose title or author contains `search_text`, ignoring case.
///
/// Blank search text returns the list untouched.
pub fn filter(search_text: &str, list: Vec<PodcastFolder>) -> Vec<PodcastFolder> {
    if search_text.trim().is_empty() {
        return list;
    }
    let needle = search_text.to_lowercase();

    list.into_iter()
        .filter(|item| {
            item.podcast.title.to_lowercase().contains(&needle)
                || item
                    .podcast
                    .author
                    .as_deref()
                    .is_some_and(|author| author.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Order podcasts for the folder podcast picker.
///
/// `sorted_by_release_date` must arrive newest episode first. Podcasts
/// without a folder, or already in `current_folder_id`, come first; podcasts
/// filed in another folder follow. `sort_type` only orders within each group.
pub fn sort_for_selecting_podcasts(
    sort_type: PodcastsSortType,
    sorted_by_release_date: Vec<PodcastFolder>,
    current_folder_id: Option<&str>,
) -> Vec<PodcastFolder> {
    let (mut available, mut elsewhere): (Vec<_>, Vec<_>) =
        sorted_by_release_date.into_iter().partition(|item| {
            match &item.folder {
                None => true,
                Some(folder) => Some(folder.id.as_str()) == current_folder_id,
            }
        });

    sort_group(sort_type, &mut available);
    sort_group(sort_type, &mut elsewhere);

    available.extend(elsewhere);
    available
}

fn sort_group(sort_type: PodcastsSortType, group: &mut [PodcastFolder]) {
    match sort_type {
        PodcastsSortType::NameAToZ => {
            group.sort_by_cached_key(|item| clean_string_for_sort(&item.podcast.title))
        }
        PodcastsSortType::DateAddedOldestToNewest => {
            group.sort_by_key(|item| item.podcast.added_date)
        }
        // Input already arrives newest first
        PodcastsSortType::EpisodeDateNewestToOldest => {}
        PodcastsSortType::DragDrop => group.sort_by_key(|item| item.podcast.sort_position),
    }
}

/// Order a plain podcast list by `sort_type`, no partitioning
pub fn sort_podcasts(sort_type: PodcastsSortType, podcasts: &mut [Podcast]) {
    match sort_type {
        PodcastsSortType::NameAToZ => {
            podcasts.sort_by_cached_key(|podcast| clean_string_for_sort(&podcast.title))
        }
        PodcastsSortType::DateAddedOldestToNewest => {
            podcasts.sort_by_key(|podcast| podcast.added_date)
        }
        PodcastsSortType::EpisodeDateNewestToOldest => {
            podcasts.sort_by_key(|podcast| Reverse(podcast.latest_episode_date))
        }
        PodcastsSortType::DragDrop => podcasts.sort_by_key(|podcast| podcast.sort_position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn make_folder(id: &str) -> Folder {
        Folder {
            id: id.to_string(),
            name: format!("Folder {id}"),
            color: 0,
            added_date: base(),
            sort_position: 0,
            podcasts_sort_type: PodcastsSortType::NameAToZ,
            deleted: false,
            sync_modified: base(),
        }
    }

    fn make_item(
        title: &str,
        author: &str,
        added_days: i64,
        folder: Option<&str>,
    ) -> PodcastFolder {
        let mut podcast = Podcast::new(
            title.to_lowercase().replace(' ', "-"),
            title,
            base() + Duration::days(added_days),
        );
        podcast.author = Some(author.to_string());
        podcast.folder_id = folder.map(String::from);
        PodcastFolder {
            podcast,
            folder: folder.map(make_folder),
        }
    }

    fn titles(list: &[PodcastFolder]) -> Vec<&str> {
        list.iter().map(|item| item.podcast.title.as_str()).collect()
    }

    fn fixture() -> Vec<PodcastFolder> {
        vec![
            make_item("The Daily", "The New York Times", 3, Some("news")),
            make_item("Zebra Talk", "Zoo Radio", 1, None),
            make_item("Hard Fork", "The New York Times", 2, None),
            make_item("Accidental Tech", "ATP", 0, Some("tech")),
        ]
    }

    #[test]
    fn filter_matches_title_ignoring_case() {
        let result = filter("Daily", fixture());
        assert_eq!(titles(&result), vec!["The Daily"]);

        let result = filter("dAiLy", fixture());
        assert_eq!(titles(&result), vec!["The Daily"]);
    }

    #[test]
    fn filter_matches_author() {
        let result = filter("new york", fixture());
        assert_eq!(titles(&result), vec!["The Daily", "Hard Fork"]);
    }

    #[test]
    fn filter_empty_text_is_identity() {
        let result = filter("", fixture());
        assert_eq!(result, fixture());
    }

    #[test]
    fn filter_without_match_is_empty() {
        assert!(filter("nothing like this", fixture()).is_empty());
    }

    #[test]
    fn name_sort_puts_unfiled_first_and_ignores_article() {
        let result = sort_for_selecting_podcasts(PodcastsSortType::NameAToZ, fixture(), None);

        assert_eq!(
            titles(&result),
            vec!["Hard Fork", "Zebra Talk", "Accidental Tech", "The Daily"]
        );
    }

    #[test]
    fn current_folder_counts_as_unfiled() {
        let result =
            sort_for_selecting_podcasts(PodcastsSortType::NameAToZ, fixture(), Some("news"));

        assert_eq!(
            titles(&result),
            vec!["The Daily", "Hard Fork", "Zebra Talk", "Accidental Tech"]
        );
    }

    #[test]
    fn date_added_sort_orders_within_groups() {
        let result = sort_for_selecting_podcasts(
            PodcastsSortType::DateAddedOldestToNewest,
            fixture(),
            None,
        );

        assert_eq!(
            titles(&result),
            vec!["Zebra Talk", "Hard Fork", "Accidental Tech", "The Daily"]
        );
    }

    #[test]
    fn episode_date_sort_keeps_input_order_within_groups() {
        let result = sort_for_selecting_podcasts(
            PodcastsSortType::EpisodeDateNewestToOldest,
            fixture(),
            None,
        );

        assert_eq!(
            titles(&result),
            vec!["Zebra Talk", "Hard Fork", "The Daily", "Accidental Tech"]
        );
    }

    #[test]
    fn clean_string_drops_leading_article_only() {
        assert_eq!(clean_string_for_sort("The Daily"), "daily");
        assert_eq!(clean_string_for_sort("Theory of Everything"), "theory of everything");
        assert_eq!(clean_string_for_sort("Into The Wild"), "into the wild");
    }

    #[test]
    fn sort_podcasts_by_latest_episode() {
        let mut older = Podcast::new("a", "A", base());
        older.latest_episode_date = Some(base());
        let mut newer = Podcast::new("b", "B", base());
        newer.latest_episode_date = Some(base() + Duration::days(1));
        let mut podcasts = vec![older, newer];

        sort_podcasts(PodcastsSortType::EpisodeDateNewestToOldest, &mut podcasts);

        assert_eq!(podcasts[0].id, "b");
    }

    #[test]
    fn filter_keeps_trailing_space_in_search_text() {
        let list = vec![
            make_item("Theory Hour", "Hour Co", 0, None),
            make_item("The Daily", "Daily Co", 1, None),
        ];

        let result = filter("the ", list);

        assert_eq!(titles(&result), vec!["The Daily"]);
    }

    #[test]
    fn filter_blank_text_is_identity() {
        assert_eq!(filter("   ", fixture()).len(), 4);
    }

    #[test]
    fn home_items_show_podcasts_of_missing_folders_on_their_own() {
        let mut filed = Podcast::new("filed", "Filed", base());
        filed.folder_id = Some("news".to_string());
        let mut orphan = Podcast::new("orphan", "Orphan", base() + Duration::days(1));
        orphan.folder_id = Some("gone".to_string());
        let loose = Podcast::new("loose", "Loose", base() + Duration::days(2));

        for sort_type in [
            PodcastsSortType::DateAddedOldestToNewest,
            PodcastsSortType::EpisodeDateNewestToOldest,
        ] {
            let items = build_home_items(
                sort_type,
                vec![filed.clone(), orphan.clone(), loose.clone()],
                vec![make_folder("news")],
            );

            let mut titles: Vec<&str> = items.iter().map(FolderItem::title).collect();
            titles.sort();
            assert_eq!(titles, vec!["Folder news", "Loose", "Orphan"], "{sort_type:?}");
        }
    }
}
