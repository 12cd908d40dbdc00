// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use tracing::info;

use crate::clock::{SharedClock, SharedIdGenerator};
use crate::config::OrganizerOptions;
use crate::error::OrganizerError;
use crate::library::{Folder, Library};
use crate::progress::{OrganizerEvent, SharedEventReporter};
use crate::settings::SharedSettingsStore;

use super::service::{FolderSuggestion, group_suggested_folders};

/// Turns accepted folder suggestions into real folders
pub struct FolderSuggestionApplier {
    library: Arc<Library>,
    settings: SharedSettingsStore,
    clock: SharedClock,
    ids: SharedIdGenerator,
    reporter: SharedEventReporter,
    palette_size: usize,
}

impl FolderSuggestionApplier {
    pub fn new(
        library: Arc<Library>,
        settings: SharedSettingsStore,
        clock: SharedClock,
        ids: SharedIdGenerator,
        reporter: SharedEventReporter,
        options: &OrganizerOptions,
    ) -> Self {
        Self {
            library,
            settings,
            clock,
            ids,
            reporter,
            palette_size: options.folder_palette_size.max(1),
        }
    }

    /// Suggestions currently on offer, grouped by folder name
    pub fn pending(&self) -> Result<Vec<FolderSuggestion>, OrganizerError> {
        let rows = self.library.suggested_folders()?;
        Ok(group_suggested_folders(&rows))
    }

    /// Create one folder per accepted grouping and move its podcasts in.
    ///
    /// Folders take the global podcast sort type, cycle through the colour
    /// palette and head the home list in selection order. Everything, including clearing the
    /// suggestion table, lands in a single library write.
    pub fn use_suggested_folders(
        &self,
        selection: &[FolderSuggestion],
    ) -> Result<Vec<Folder>, OrganizerError> {
        let sort_type = self.settings.load()?.podcasts_sort_type;
        let now = self.clock.now();

        let mut folders = Vec::with_capacity(selection.len());
        let mut assignments = Vec::new();
        for (index, suggestion) in selection.iter().enumerate() {
            let folder = Folder {
                id: self.ids.new_id(),
                name: suggestion.name.clone(),
                color: index % self.palette_size,
                added_date: now,
                sort_position: 0,
                podcasts_sort_type: sort_type,
                deleted: false,
                sync_modified: now,
            };
            assignments.extend(
                suggestion
                    .podcasts
                    .iter()
                    .map(|podcast_id| (podcast_id.clone(), folder.id.clone())),
            );
            folders.push(folder);
        }

        let moved = self
            .library
            .apply_folder_suggestions(folders.clone(), assignments)?;

        for (folder, suggestion) in folders.iter().zip(selection) {
            self.reporter.report(OrganizerEvent::FolderCreated {
                folder_id: folder.id.clone(),
                name: folder.name.clone(),
                podcasts: suggestion.podcasts.len(),
            });
        }
        info!(folders = folders.len(), podcasts = moved, "Suggested folders applied");
        self.reporter.report(OrganizerEvent::SuggestionsApplied {
            folders: folders.len(),
            podcasts: moved,
        });

        Ok(folders)
    }
}
