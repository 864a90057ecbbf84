mod json_file;
mod memory;
mod sqlite;
mod watcher;

pub use json_file::JsonFileMirrorBackend;
pub use memory::MemoryMirrorBackend;
pub use sqlite::SqliteMirrorBackend;
pub use watcher::spawn_revision_watcher;
