// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::clock::{SharedClock, SharedIdGenerator};
use crate::error::{OrganizerError, StoreError};
use crate::library::{Folder, Library, Podcast};
use crate::settings::SharedSettingsStore;

use super::sort::{FolderItem, PodcastsSortType, build_home_items, sort_podcasts};

/// User-facing folder operations
pub struct FolderManager {
    library: Arc<Library>,
    settings: SharedSettingsStore,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl FolderManager {
    pub fn new(
        library: Arc<Library>,
        settings: SharedSettingsStore,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> Self {
        Self {
            library,
            settings,
            clock,
            ids,
        }
    }

    /// Create a folder holding `podcast_ids`. The new folder goes first on
    /// the home list and the other top-level items move down one place.
    pub fn create(
        &self,
        name: &str,
        color: usize,
        podcasts_sort_type: PodcastsSortType,
        podcast_ids: &[String],
    ) -> Result<Folder, StoreError> {
        let now = self.clock.now();
        let folder = Folder {
            id: self.ids.new_id(),
            name: name.to_string(),
            color,
            added_date: now,
            sort_position: 0,
            podcasts_sort_type,
            deleted: false,
            sync_modified: now,
        };
        self.library.insert_folder(folder.clone(), podcast_ids)?;

        debug!(folder_id = %folder.id, podcasts = podcast_ids.len(), "Folder created");
        Ok(folder)
    }

    pub fn delete(&self, folder_id: &str) -> Result<(), StoreError> {
        self.library.delete_folder(folder_id, self.clock.now())?;
        debug!(%folder_id, "Folder deleted");
        Ok(())
    }

    /// Make `podcast_ids` the exact contents of the folder
    pub fn update_podcasts(
        &self,
        folder_id: &str,
        podcast_ids: &[String],
    ) -> Result<(), StoreError> {
        if self.library.folder(folder_id)?.is_none() {
            return Err(StoreError::FolderNotFound(folder_id.to_string()));
        }

        let wanted: BTreeSet<&str> = podcast_ids.iter().map(String::as_str).collect();
        let current: Vec<String> = self
            .library
            .podcasts_in_folder(folder_id)?
            .into_iter()
            .map(|podcast| podcast.id)
            .collect();

        let removed: Vec<String> = current
            .iter()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        let added: Vec<String> = wanted
            .iter()
            .filter(|id| !current.iter().any(|c| c == *id))
            .map(|id| id.to_string())
            .collect();

        if !removed.is_empty() {
            self.library.update_folder_id(None, &removed)?;
        }
        if !added.is_empty() {
            self.library.update_folder_id(Some(folder_id), &added)?;
        }
        self.touch(folder_id, |_| {})
    }

    pub fn rename(&self, folder_id: &str, name: &str) -> Result<(), StoreError> {
        self.touch(folder_id, |folder| folder.name = name.to_string())
    }

    pub fn recolor(&self, folder_id: &str, color: usize) -> Result<(), StoreError> {
        self.touch(folder_id, |folder| folder.color = color)
    }

    pub fn update_sort_type(
        &self,
        folder_id: &str,
        sort_type: PodcastsSortType,
    ) -> Result<(), StoreError> {
        self.touch(folder_id, |folder| folder.podcasts_sort_type = sort_type)
    }

    /// Podcasts of a folder in the folder's own order
    pub fn folder_podcasts_sorted(&self, folder_id: &str) -> Result<Vec<Podcast>, StoreError> {
        let folder = self
            .library
            .folder(folder_id)?
            .ok_or_else(|| StoreError::FolderNotFound(folder_id.to_string()))?;
        let mut podcasts = self.library.podcasts_in_folder(folder_id)?;
        sort_podcasts(folder.podcasts_sort_type, &mut podcasts);
        Ok(podcasts)
    }

    /// The top-level podcasts screen: live folders and the subscribed
    /// podcasts outside them, ordered by the global podcasts sort type
    pub fn home_folder(&self) -> Result<Vec<FolderItem>, OrganizerError> {
        let sort_type = self.settings.load()?.podcasts_sort_type;
        let podcasts = self.library.subscribed_podcasts()?;
        let folders = self.library.folders()?;
        Ok(build_home_items(sort_type, podcasts, folders))
    }

    fn touch(&self, folder_id: &str, f: impl FnOnce(&mut Folder)) -> Result<(), StoreError> {
        let now = self.clock.now();
        self.library.update_folder(folder_id, |folder| {
            f(folder);
            folder.sync_modified = now;
        })
    }
}
