// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::folders::PodcastsSortType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayingStatus {
    NotPlayed,
    InProgress,
    Completed,
}

/// Whether a row still has to be pushed to the sync server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncStatus {
    #[default]
    Synced,
    NotSynced,
}

/// A podcast known to the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub added_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_episode_date: Option<DateTime<Utc>>,
    pub sort_position: i32,
    pub sync_status: SyncStatus,
}

impl Podcast {
    /// A subscribed podcast outside any folder
    pub fn new(id: impl Into<String>, title: impl Into<String>, added_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            subscribed: true,
            folder_id: None,
            added_date,
            latest_episode_date: None,
            sort_position: 0,
            sync_status: SyncStatus::Synced,
        }
    }
}

/// A single episode of a podcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub podcast_id: String,
    pub title: String,
    pub published: DateTime<Utc>,
    pub duration: Duration,
    pub playing_status: PlayingStatus,
    pub downloaded: bool,
    /// MIME type of the enclosure, e.g. `audio/mpeg`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub starred: bool,
}

impl Episode {
    pub fn new(
        id: impl Into<String>,
        podcast_id: impl Into<String>,
        title: impl Into<String>,
        published: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            podcast_id: podcast_id.into(),
            title: title.into(),
            published,
            duration: Duration::ZERO,
            playing_status: PlayingStatus::NotPlayed,
            downloaded: false,
            file_type: None,
            starred: false,
        }
    }

    pub fn is_video(&self) -> bool {
        self.file_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("video/"))
    }
}

/// A user folder grouping podcasts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Index into the folder colour palette
    pub color: usize,
    pub added_date: DateTime<Utc>,
    pub sort_position: i32,
    pub podcasts_sort_type: PodcastsSortType,
    pub deleted: bool,
    pub sync_modified: DateTime<Utc>,
}

/// One podcast of a server-suggested folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFolder {
    pub name: String,
    pub podcast_id: String,
}
