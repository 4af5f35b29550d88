//! Storage service
//!
//! File system operations confined to a fixed root directory. Every path
//! argument is resolved and validated before any filesystem access, so only
//! confined absolute paths ever reach the `fs` primitives.

use log::{error, info};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::results::{EntryKind, FileResource};
use crate::storage::validation::{resolve_and_validate_path, resolve_base_dir, validate_filename};

/// File storage confined to a single root directory.
///
/// The root is fixed at initialization and never mutated afterwards. All
/// public operations take paths relative to it; the root itself is denoted
/// by the empty string.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Initialize the storage service over `base_dir`, creating the
    /// directory (and missing ancestors) if it does not exist yet.
    ///
    /// Fails if the configured path exists but is not a directory.
    pub fn init(base_dir: &str) -> Result<Self, StorageError> {
        let root = resolve_base_dir(base_dir)?;

        if root.exists() {
            if !root.is_dir() {
                return Err(StorageError::NotADirectory(root.display().to_string()));
            }
        } else {
            fs::create_dir_all(&root)?;
            info!("Created storage root {}", root.display());
        }

        info!("Using storage root {}", root.display());
        Ok(Self { root })
    }

    /// The absolute, normalized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` as `target_directory/filename`, creating the target
    /// directory and its ancestors if needed. An existing file at that
    /// location is overwritten. Returns the stored file's relative path.
    pub fn add(
        &self,
        content: &[u8],
        target_directory: &str,
        filename: &str,
    ) -> Result<String, StorageError> {
        info!("Adding file {} to directory '{}'", filename, target_directory);

        if content.is_empty() {
            return Err(StorageError::EmptyInput(
                "cannot store empty content".into(),
            ));
        }
        validate_filename(filename)?;

        let target_dir = self.resolve(target_directory)?;
        if target_dir.exists() && !target_dir.is_dir() {
            return Err(StorageError::NotADirectory(target_directory.into()));
        }
        fs::create_dir_all(&target_dir)?;

        let file_path = target_dir.join(filename);
        // Filename already passed validation; re-verify containment anyway.
        if !file_path.starts_with(&self.root) {
            return Err(StorageError::OutsideRoot(filename.into()));
        }

        fs::write(&file_path, content)?;
        Ok(self.relative_of(&file_path))
    }

    /// Open an existing regular file as a byte-readable handle.
    pub fn open(&self, file_path: &str) -> Result<FileResource, StorageError> {
        let path = self.resolve(file_path)?;
        if !path.exists() {
            return Err(StorageError::FileNotFound(file_path.into()));
        }
        if !path.is_file() {
            return Err(StorageError::NotAFile(file_path.into()));
        }
        let relative = self.relative_of(&path);
        Ok(FileResource::new(path, relative))
    }

    /// List the names of regular files directly inside `directory`.
    pub fn list_files(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        self.list_entries(directory, EntryKind::File)
    }

    /// List the names of subdirectories directly inside `directory`.
    pub fn list_directories(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        self.list_entries(directory, EntryKind::Directory)
    }

    /// List the names of all entries directly inside `directory`.
    pub fn list_items(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        self.list_entries(directory, EntryKind::Any)
    }

    /// Create `directory` and any missing ancestors. Succeeds if an
    /// identical directory already exists; fails if a non-directory entry
    /// occupies the path. Returns the directory's relative path.
    pub fn create_directory(&self, directory: &str) -> Result<String, StorageError> {
        info!("Creating directory '{}'", directory);

        if directory.trim().is_empty() {
            return Err(StorageError::EmptyInput(
                "directory path cannot be empty".into(),
            ));
        }

        let dir = self.resolve(directory)?;
        if dir.exists() {
            if dir.is_dir() {
                return Ok(self.relative_of(&dir));
            }
            return Err(StorageError::NotADirectory(directory.into()));
        }

        fs::create_dir_all(&dir)?;
        Ok(self.relative_of(&dir))
    }

    /// Copy a regular file to `target`, overwriting any existing file
    /// there. The target's parent directory must already exist. Returns the
    /// target's relative path.
    pub fn copy_file(&self, source: &str, target: &str) -> Result<String, StorageError> {
        info!("Copying file '{}' to '{}'", source, target);

        let (source_path, target_path) = self.resolve_file_pair(source, target)?;
        fs::copy(&source_path, &target_path)?;
        Ok(self.relative_of(&target_path))
    }

    /// Move a regular file to `target`, overwriting any existing file
    /// there; the source no longer exists afterwards. The target's parent
    /// directory must already exist. Returns the target's relative path.
    pub fn move_file(&self, source: &str, target: &str) -> Result<String, StorageError> {
        info!("Moving file '{}' to '{}'", source, target);

        let (source_path, target_path) = self.resolve_file_pair(source, target)?;
        fs::rename(&source_path, &target_path)?;
        Ok(self.relative_of(&target_path))
    }

    /// Relocate a directory and its entire subtree to `new_directory`,
    /// which must not exist yet.
    pub fn rename_directory(
        &self,
        old_directory: &str,
        new_directory: &str,
    ) -> Result<(), StorageError> {
        info!(
            "Renaming directory '{}' to '{}'",
            old_directory, new_directory
        );

        if old_directory.trim().is_empty() || new_directory.trim().is_empty() {
            return Err(StorageError::EmptyInput(
                "old or new directory path cannot be empty".into(),
            ));
        }

        let source = self.resolve(old_directory)?;
        let target = self.resolve(new_directory)?;

        if !source.exists() {
            return Err(StorageError::DirectoryNotFound(old_directory.into()));
        }
        if !source.is_dir() {
            return Err(StorageError::NotADirectory(old_directory.into()));
        }
        if source == self.root {
            return Err(StorageError::RootProtected(old_directory.into()));
        }
        if target.exists() {
            return Err(StorageError::TargetAlreadyExists(new_directory.into()));
        }

        fs::rename(&source, &target)?;
        Ok(())
    }

    /// Delete a file or an empty directory. Refuses to delete the root.
    pub fn delete(&self, path: &str) -> Result<(), StorageError> {
        info!("Deleting '{}'", path);

        if path.trim().is_empty() {
            return Err(StorageError::EmptyInput(
                "path to delete cannot be empty".into(),
            ));
        }

        let target = self.resolve(path)?;
        if !target.exists() {
            return Err(StorageError::FileNotFound(path.into()));
        }
        if target == self.root {
            return Err(StorageError::RootProtected(path.into()));
        }

        if target.is_dir() {
            if fs::read_dir(&target)?.next().is_some() {
                return Err(StorageError::DirectoryNotEmpty(path.into()));
            }
            fs::remove_dir(&target)?;
        } else {
            fs::remove_file(&target)?;
        }
        Ok(())
    }

    /// Delete a file or a directory together with its entire subtree,
    /// descendants before ancestors. Refuses to delete the root.
    ///
    /// A removal failing mid-walk aborts with an error naming the failing
    /// path; descendants already removed stay removed.
    pub fn delete_recursive(&self, path: &str) -> Result<(), StorageError> {
        info!("Recursively deleting '{}'", path);

        if path.trim().is_empty() {
            return Err(StorageError::EmptyInput(
                "path to delete cannot be empty".into(),
            ));
        }

        let target = self.resolve(path)?;
        if !target.exists() {
            return Err(StorageError::FileNotFound(path.into()));
        }
        if target == self.root {
            return Err(StorageError::RootProtected(path.into()));
        }

        let mut subtree = Vec::new();
        collect_subtree(&target, &mut subtree)?;

        for entry in &subtree {
            let is_dir = fs::symlink_metadata(entry)?.is_dir();
            let removed = if is_dir {
                fs::remove_dir(entry)
            } else {
                fs::remove_file(entry)
            };
            removed.map_err(|e| {
                error!("Recursive deletion failed at {}: {}", entry.display(), e);
                StorageError::IoError(io::Error::new(
                    e.kind(),
                    format!("failed to delete {} during recursive deletion: {}", entry.display(), e),
                ))
            })?;
        }
        Ok(())
    }

    /// Whether an entry exists at `path`.
    pub fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    /// Whether the entry at `path` exists and is a directory.
    pub fn is_directory(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_dir())
    }

    /// Whether the entry at `path` exists and is a regular file.
    pub fn is_file(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// Size in bytes of an existing regular file.
    pub fn file_size(&self, file_path: &str) -> Result<u64, StorageError> {
        let path = self.resolve(file_path)?;
        if !path.exists() {
            return Err(StorageError::FileNotFound(file_path.into()));
        }
        if !path.is_file() {
            return Err(StorageError::NotAFile(file_path.into()));
        }
        Ok(path.metadata()?.len())
    }

    /// Snapshot of the whole tree: each directory's relative path (the root
    /// keyed by the empty string) mapped to its sorted child names.
    pub fn current_tree(&self) -> Result<BTreeMap<String, Vec<String>>, StorageError> {
        let mut tree = BTreeMap::new();
        self.collect_tree(&self.root, &mut tree)?;
        Ok(tree)
    }

    /// The validated absolute path for a relative input, for callers that
    /// need the real location of an entry.
    pub fn resolved_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        self.resolve(path)
    }

    fn resolve(&self, user_path: &str) -> Result<PathBuf, StorageError> {
        resolve_and_validate_path(&self.root, user_path)
    }

    /// Root-relative `/`-separated rendition of a resolved path; the root
    /// itself maps to the empty string.
    fn relative_of(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn list_entries(&self, directory: &str, kind: EntryKind) -> Result<Vec<String>, StorageError> {
        let dir = self.resolve(directory)?;
        if !dir.exists() {
            return Err(StorageError::DirectoryNotFound(directory.into()));
        }
        if !dir.is_dir() {
            return Err(StorageError::NotADirectory(directory.into()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let keep = match kind {
                EntryKind::File => file_type.is_file(),
                EntryKind::Directory => file_type.is_dir(),
                EntryKind::Any => true,
            };
            if keep {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Shared precondition checks for copy and move: the source must be an
    /// existing regular file and the target's parent an existing directory.
    fn resolve_file_pair(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(PathBuf, PathBuf), StorageError> {
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(StorageError::EmptyInput(
                "source or target path cannot be empty".into(),
            ));
        }

        let source_path = self.resolve(source)?;
        let target_path = self.resolve(target)?;

        if !source_path.exists() {
            return Err(StorageError::FileNotFound(source.into()));
        }
        if !source_path.is_file() {
            return Err(StorageError::NotAFile(source.into()));
        }

        let parent = match target_path.parent() {
            Some(parent) => parent,
            None => {
                return Err(StorageError::DirectoryNotFound(format!(
                    "target directory for '{}'",
                    target
                )));
            }
        };
        if !parent.exists() {
            return Err(StorageError::DirectoryNotFound(format!(
                "target directory for '{}'",
                target
            )));
        }
        if !parent.is_dir() {
            return Err(StorageError::NotADirectory(format!(
                "target directory for '{}'",
                target
            )));
        }

        Ok((source_path, target_path))
    }

    fn collect_tree(
        &self,
        dir: &Path,
        tree: &mut BTreeMap<String, Vec<String>>,
    ) -> Result<(), StorageError> {
        let mut children = Vec::new();
        let mut subdirs = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            children.push(entry.file_name().to_string_lossy().into_owned());
            if entry.file_type()?.is_dir() {
                subdirs.push(entry.path());
            }
        }
        children.sort();
        tree.insert(self.relative_of(dir), children);

        for subdir in subdirs {
            self.collect_tree(&subdir, tree)?;
        }
        Ok(())
    }
}

/// Post-order walk: descendants are pushed before the entry itself, so the
/// collected list deletes deepest-first. Symlinks are not followed.
fn collect_subtree(path: &Path, paths: &mut Vec<PathBuf>) -> Result<(), StorageError> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            collect_subtree(&entry?.path(), paths)?;
        }
    }
    paths.push(path.to_path_buf());
    Ok(())
}
