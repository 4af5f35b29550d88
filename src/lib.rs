pub mod config;
pub mod error;
pub mod storage;

pub use error::{ErrorKind, StorageError};
pub use storage::{EntryKind, FileResource, Storage};
