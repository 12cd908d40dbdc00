// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the in-memory library store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Library lock was poisoned by a panicking writer")]
    Poisoned,

    #[error("Unknown podcast: {0}")]
    PodcastNotFound(String),

    #[error("Unknown folder: {0}")]
    FolderNotFound(String),

    #[error("Unknown smart playlist: {0}")]
    PlaylistNotFound(String),
}

/// Errors that can occur when saving or loading a library snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read library snapshot {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write library snapshot {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse library snapshot JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize library snapshot: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that can occur when reading or writing persisted settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),

    #[error("Settings lock was poisoned by a panicking writer")]
    Poisoned,
}

/// Errors that can occur when asking the server for folder suggestions
#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid suggestion endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode suggestion response: {0}")]
    DecodeFailed(#[from] serde_json::Error),
}

/// Errors that can occur when loading organizer options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read options file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse options JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid prompt_cooldown_days {days} in {path}")]
    InvalidCooldown { path: PathBuf, days: i64 },
}

/// Top-level errors for organizer operations
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
