// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::folders::PodcastFolder;
use crate::playlist::SmartPlaylist;

use super::model::{Episode, Folder, Podcast, SuggestedFolder, SyncStatus};

/// Every table of the library, as persisted in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryData {
    pub podcasts: BTreeMap<String, Podcast>,
    pub episodes: BTreeMap<String, Episode>,
    pub folders: BTreeMap<String, Folder>,
    pub suggested_folders: Vec<SuggestedFolder>,
    pub playlists: BTreeMap<String, SmartPlaylist>,
}

/// In-memory podcast library with change notification.
///
/// Any mutation of the podcast or episode tables bumps a revision counter
/// published through [`Library::changes`]. Folder, suggestion and playlist
/// writes do not, since they cannot change which episodes match a rule set.
#[derive(Debug)]
pub struct Library {
    data: RwLock<LibraryData>,
    revision: watch::Sender<u64>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::from_data(LibraryData::default())
    }

    pub fn from_data(data: LibraryData) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            data: RwLock::new(data),
            revision,
        }
    }

    /// Receiver that observes a new revision after every relevant write
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn read<R>(&self, f: impl FnOnce(&LibraryData) -> R) -> Result<R, StoreError> {
        let guard = self.data.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&guard))
    }

    fn write<R>(
        &self,
        notify: bool,
        f: impl FnOnce(&mut LibraryData) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let result = {
            let mut guard = self.data.write().map_err(|_| StoreError::Poisoned)?;
            f(&mut guard)?
        };
        if notify {
            self.revision.send_modify(|revision| *revision += 1);
        }
        Ok(result)
    }

    /// Copy of every table
    pub fn snapshot(&self) -> Result<LibraryData, StoreError> {
        self.read(Clone::clone)
    }

    // Podcasts

    pub fn upsert_podcast(&self, podcast: Podcast) -> Result<(), StoreError> {
        self.write(true, |data| {
            data.podcasts.insert(podcast.id.clone(), podcast);
            Ok(())
        })
    }

    pub fn set_subscribed(&self, podcast_id: &str, subscribed: bool) -> Result<(), StoreError> {
        self.write(true, |data| {
            let podcast = data
                .podcasts
                .get_mut(podcast_id)
                .ok_or_else(|| StoreError::PodcastNotFound(podcast_id.to_string()))?;
            podcast.subscribed = subscribed;
            if !subscribed {
                podcast.folder_id = None;
            }
            Ok(())
        })
    }

    pub fn podcast(&self, podcast_id: &str) -> Result<Option<Podcast>, StoreError> {
        self.read(|data| data.podcasts.get(podcast_id).cloned())
    }

    pub fn podcasts(&self) -> Result<Vec<Podcast>, StoreError> {
        self.read(|data| data.podcasts.values().cloned().collect())
    }

    pub fn subscribed_podcasts(&self) -> Result<Vec<Podcast>, StoreError> {
        self.read(|data| {
            data.podcasts
                .values()
                .filter(|podcast| podcast.subscribed)
                .cloned()
                .collect()
        })
    }

    pub fn subscribed_podcast_ids(&self) -> Result<Vec<String>, StoreError> {
        self.read(|data| {
            data.podcasts
                .values()
                .filter(|podcast| podcast.subscribed)
                .map(|podcast| podcast.id.clone())
                .collect()
        })
    }

    pub fn podcasts_in_folder(&self, folder_id: &str) -> Result<Vec<Podcast>, StoreError> {
        self.read(|data| {
            data.podcasts
                .values()
                .filter(|podcast| podcast.subscribed)
                .filter(|podcast| podcast.folder_id.as_deref() == Some(folder_id))
                .cloned()
                .collect()
        })
    }

    /// Subscribed podcasts with their live folder, newest episode first
    pub fn podcast_folders_by_release_date(&self) -> Result<Vec<PodcastFolder>, StoreError> {
        self.read(|data| {
            let mut podcasts: Vec<&Podcast> = data
                .podcasts
                .values()
                .filter(|podcast| podcast.subscribed)
                .collect();
            podcasts.sort_by_key(|podcast| Reverse(podcast.latest_episode_date));

            podcasts
                .into_iter()
                .map(|podcast| PodcastFolder {
                    podcast: podcast.clone(),
                    folder: podcast
                        .folder_id
                        .as_deref()
                        .and_then(|id| data.folders.get(id))
                        .filter(|folder| !folder.deleted)
                        .cloned(),
                })
                .collect()
        })
    }

    /// Move podcasts into `folder_id` (or out of any folder when `None`)
    /// and flag them for sync
    pub fn update_folder_id(
        &self,
        folder_id: Option<&str>,
        podcast_ids: &[String],
    ) -> Result<(), StoreError> {
        self.write(true, |data| {
            for id in podcast_ids {
                if let Some(podcast) = data.podcasts.get_mut(id) {
                    podcast.folder_id = folder_id.map(String::from);
                    podcast.sync_status = SyncStatus::NotSynced;
                }
            }
            Ok(())
        })
    }

    // Episodes

    pub fn upsert_episode(&self, episode: Episode) -> Result<(), StoreError> {
        self.write(true, |data| {
            data.episodes.insert(episode.id.clone(), episode);
            Ok(())
        })
    }

    /// Change one episode in place
    pub fn update_episode(
        &self,
        episode_id: &str,
        f: impl FnOnce(&mut Episode),
    ) -> Result<(), StoreError> {
        self.write(true, |data| {
            // Missing ids are ignored
            if let Some(episode) = data.episodes.get_mut(episode_id) {
                f(episode);
            }
            Ok(())
        })
    }

    pub fn episodes(&self) -> Result<Vec<Episode>, StoreError> {
        self.read(|data| data.episodes.values().cloned().collect())
    }

    /// Run `f` over the podcast and episode tables without copying them
    pub fn with_podcasts_and_episodes<R>(
        &self,
        f: impl FnOnce(&BTreeMap<String, Podcast>, &BTreeMap<String, Episode>) -> R,
    ) -> Result<R, StoreError> {
        self.read(|data| f(&data.podcasts, &data.episodes))
    }

    // Folders

    /// Folders that have not been deleted
    pub fn folders(&self) -> Result<Vec<Folder>, StoreError> {
        self.read(|data| {
            data.folders
                .values()
                .filter(|folder| !folder.deleted)
                .cloned()
                .collect()
        })
    }

    pub fn folder(&self, folder_id: &str) -> Result<Option<Folder>, StoreError> {
        self.read(|data| {
            data.folders
                .get(folder_id)
                .filter(|folder| !folder.deleted)
                .cloned()
        })
    }

    /// Insert a folder and move `podcast_ids` into it in one step.
    ///
    /// The folder goes to the top of the home list and every other top-level
    /// item is renumbered behind it.
    pub fn insert_folder(&self, folder: Folder, podcast_ids: &[String]) -> Result<(), StoreError> {
        self.write(true, |data| {
            assign(data, &folder.id, podcast_ids);
            let modified = folder.sync_modified;
            let first = [folder.id.clone()];
            data.folders.insert(folder.id.clone(), folder);
            renumber_home(data, &first, modified);
            Ok(())
        })
    }

    pub fn update_folder(
        &self,
        folder_id: &str,
        f: impl FnOnce(&mut Folder),
    ) -> Result<(), StoreError> {
        self.write(false, |data| {
            let folder = data
                .folders
                .get_mut(folder_id)
                .filter(|folder| !folder.deleted)
                .ok_or_else(|| StoreError::FolderNotFound(folder_id.to_string()))?;
            f(folder);
            Ok(())
        })
    }

    /// Mark a folder deleted and move its podcasts back to the top level
    pub fn delete_folder(
        &self,
        folder_id: &str,
        modified: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.write(true, |data| {
            let folder = data
                .folders
                .get_mut(folder_id)
                .filter(|folder| !folder.deleted)
                .ok_or_else(|| StoreError::FolderNotFound(folder_id.to_string()))?;
            folder.deleted = true;
            folder.sync_modified = modified;

            for podcast in data.podcasts.values_mut() {
                if podcast.folder_id.as_deref() == Some(folder_id) {
                    podcast.folder_id = None;
                    podcast.sync_status = SyncStatus::NotSynced;
                }
            }
            Ok(())
        })
    }

    // Suggested folders

    pub fn suggested_folders(&self) -> Result<Vec<SuggestedFolder>, StoreError> {
        self.read(|data| data.suggested_folders.clone())
    }

    /// Swap the whole suggestion table for `suggestions`
    pub fn replace_suggested_folders(
        &self,
        suggestions: Vec<SuggestedFolder>,
    ) -> Result<(), StoreError> {
        self.write(false, |data| {
            data.suggested_folders = suggestions;
            Ok(())
        })
    }

    pub fn clear_suggested_folders(&self) -> Result<(), StoreError> {
        self.replace_suggested_folders(Vec::new())
    }

    /// Commit accepted suggestions as one unit.
    ///
    /// Inserts `folders` at the top of the home list in the given order,
    /// points each `(podcast_id, folder_id)` assignment at its folder, flags
    /// those podcasts for sync and empties the suggestion table. Assignments naming a folder outside `folders` or an unknown
    /// podcast are skipped. Returns the number of podcasts moved.
    pub fn apply_folder_suggestions(
        &self,
        folders: Vec<Folder>,
        assignments: Vec<(String, String)>,
    ) -> Result<usize, StoreError> {
        self.write(true, |data| {
            let mut moved = 0;
            for (podcast_id, folder_id) in assignments {
                if !folders.iter().any(|folder| folder.id == folder_id) {
                    tracing::warn!(
                        %podcast_id,
                        %folder_id,
                        "Assignment to uncommitted folder skipped"
                    );
                    continue;
                }
                match data.podcasts.get_mut(&podcast_id) {
                    Some(podcast) => {
                        podcast.folder_id = Some(folder_id);
                        podcast.sync_status = SyncStatus::NotSynced;
                        moved += 1;
                    }
                    None => {
                        tracing::warn!(%podcast_id, "Suggested podcast no longer in library");
                    }
                }
            }
            let first: Vec<String> = folders.iter().map(|folder| folder.id.clone()).collect();
            let modified = folders.first().map(|folder| folder.sync_modified);
            for folder in folders {
                data.folders.insert(folder.id.clone(), folder);
            }
            if let Some(modified) = modified {
                renumber_home(data, &first, modified);
            }
            data.suggested_folders.clear();
            Ok(moved)
        })
    }

    // Smart playlists

    pub fn upsert_playlist(&self, playlist: SmartPlaylist) -> Result<(), StoreError> {
        self.write(false, |data| {
            data.playlists.insert(playlist.id.clone(), playlist);
            Ok(())
        })
    }

    pub fn delete_playlist(&self, playlist_id: &str) -> Result<(), StoreError> {
        self.write(false, |data| {
            data.playlists
                .remove(playlist_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::PlaylistNotFound(playlist_id.to_string()))
        })
    }

    pub fn playlist(&self, playlist_id: &str) -> Result<Option<SmartPlaylist>, StoreError> {
        self.read(|data| data.playlists.get(playlist_id).cloned())
    }

    pub fn playlists(&self) -> Result<Vec<SmartPlaylist>, StoreError> {
        self.read(|data| data.playlists.values().cloned().collect())
    }
}

/// Give `first` drag-drop positions 0.., then number the remaining live
/// folders and unfiled subscribed podcasts after them in their current
/// order. Moved folders get `modified` as their sync time, moved podcasts
/// are flagged for sync.
fn renumber_home(data: &mut LibraryData, first: &[String], modified: DateTime<Utc>) {
    // (current position, is folder, id)
    let mut rest: Vec<(i32, bool, String)> = data
        .folders
        .values()
        .filter(|folder| !folder.deleted && !first.contains(&folder.id))
        .map(|folder| (folder.sort_position, true, folder.id.clone()))
        .chain(
            data.podcasts
                .values()
                .filter(|podcast| podcast.subscribed && podcast.folder_id.is_none())
                .map(|podcast| (podcast.sort_position, false, podcast.id.clone())),
        )
        .collect();
    rest.sort_by_key(|(position, _, _)| *position);

    let order = first
        .iter()
        .map(|id| (true, id.clone()))
        .chain(rest.into_iter().map(|(_, is_folder, id)| (is_folder, id)));

    for (position, (is_folder, id)) in (0..).zip(order) {
        if is_folder {
            match data.folders.get_mut(&id) {
                Some(folder) if folder.sort_position != position => {
                    folder.sort_position = position;
                    folder.sync_modified = modified;
                }
                _ => {}
            }
        } else {
            match data.podcasts.get_mut(&id) {
                Some(podcast) if podcast.sort_position != position => {
                    podcast.sort_position = position;
                    podcast.sync_status = SyncStatus::NotSynced;
                }
                _ => {}
            }
        }
    }
}

fn assign(data: &mut LibraryData, folder_id: &str, podcast_ids: &[String]) {
    for id in podcast_ids {
        if let Some(podcast) = data.podcasts.get_mut(id) {
            podcast.folder_id = Some(folder_id.to_string());
            podcast.sync_status = SyncStatus::NotSynced;
        }
    }
}
