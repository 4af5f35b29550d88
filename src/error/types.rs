//! Error types
//!
//! Defines the storage error type and its classification into error kinds.

use std::fmt;
use std::io;

/// Broad classification of a storage error, for callers that branch on the
/// error class rather than the exact cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blank or malformed argument, traversal attempt, absolute-path input,
    /// or a resolved path outside the storage root.
    Validation,
    /// A file or directory was absent where existence was required.
    NotFound,
    /// An entry already occupies a path where exclusivity or a different
    /// entry kind was required.
    Conflict,
    /// The operation is not allowed in the current filesystem state.
    State,
    /// The underlying filesystem operation failed.
    Io,
}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    EmptyInput(String),
    InvalidPath(String),
    AbsolutePath(String),
    PathTraversal(String),
    OutsideRoot(String),
    FileNotFound(String),
    DirectoryNotFound(String),
    NotAFile(String),
    NotADirectory(String),
    TargetAlreadyExists(String),
    DirectoryNotEmpty(String),
    RootProtected(String),
    IoError(io::Error),
}

impl StorageError {
    /// Classify this error per the storage error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::EmptyInput(_)
            | StorageError::InvalidPath(_)
            | StorageError::AbsolutePath(_)
            | StorageError::PathTraversal(_)
            | StorageError::OutsideRoot(_) => ErrorKind::Validation,
            StorageError::FileNotFound(_)
            | StorageError::DirectoryNotFound(_)
            | StorageError::NotAFile(_) => ErrorKind::NotFound,
            StorageError::NotADirectory(_) | StorageError::TargetAlreadyExists(_) => {
                ErrorKind::Conflict
            }
            StorageError::DirectoryNotEmpty(_) | StorageError::RootProtected(_) => {
                ErrorKind::State
            }
            StorageError::IoError(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::EmptyInput(s) => write!(f, "Empty input: {}", s),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::AbsolutePath(p) => write!(f, "Absolute paths are not allowed: {}", p),
            StorageError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            StorageError::OutsideRoot(p) => {
                write!(f, "Resolved path is outside the storage root: {}", p)
            }
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::DirectoryNotFound(p) => write!(f, "Directory not found: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a regular file: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::TargetAlreadyExists(p) => write!(f, "Target already exists: {}", p),
            StorageError::DirectoryNotEmpty(p) => write!(f, "Directory not empty: {}", p),
            StorageError::RootProtected(s) => {
                write!(f, "Cannot modify the storage root itself: {}", s)
            }
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}
