pub mod mirror;
pub mod outcome;

pub use mirror::{ContextId, MirrorChanged, MirrorSnapshot, MirroredEntry, STORAGE_KEY};
pub use outcome::RemoteOutcome;
