mod model;
mod snapshot;
mod store;

pub use model::{Episode, Folder, PlayingStatus, Podcast, SuggestedFolder, SyncStatus};
pub use snapshot::{load_snapshot, save_snapshot};
pub use store::{Library, LibraryData};
