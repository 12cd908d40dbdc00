mod manager;
mod sort;

pub use manager::FolderManager;
pub use sort::{
    FolderItem, PodcastFolder, PodcastsSortType, build_home_items, clean_string_for_sort, filter,
    sort_for_selecting_podcasts, sort_podcasts,
};
