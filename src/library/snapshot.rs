// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::SnapshotError;

use super::store::{Library, LibraryData};

/// Write every table of `library` to a pretty-printed JSON file
pub fn save_snapshot(library: &Library, path: &Path) -> Result<(), SnapshotError> {
    let data = library.snapshot()?;
    let json = serde_json::to_string_pretty(&data)?;
    std::fs::write(path, json).map_err(|e| SnapshotError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Rebuild a library from a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Library, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let data: LibraryData =
        serde_json::from_str(&content).map_err(|e| SnapshotError::JsonParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(Library::from_data(data))
}
