//! Local filesystem storage rooted at one directory.

use std::fs;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use porter_core::{FilesystemStorage, Storage, StorageEngine, StorageError};

/// Filesystem driver for a single directory tree. Object names are paths
/// relative to the root.
pub struct LocalFs {
    label: String,
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            label: root.display().to_string(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn not_found(&self, name: &str) -> StorageError {
        StorageError::NotFound {
            storage: self.label.clone(),
            name: name.to_string(),
        }
    }
}

impl Storage for LocalFs {
    fn label(&self) -> &str {
        &self.label
    }

    fn engine(&self) -> StorageEngine {
        StorageEngine::LocalFs
    }

    fn as_filesystem(&self) -> Option<&dyn FilesystemStorage> {
        Some(self)
    }
}

impl FilesystemStorage for LocalFs {
    fn open_read(&self, name: &str) -> Result<Box<dyn Read + Send>, StorageError> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(self.not_found(name));
        }
        let file = fs::File::open(&path)?;
        if file.metadata()?.len() == 0 {
            // An empty file cannot be mapped.
            return Ok(Box::new(Cursor::new(Vec::new())));
        }
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(Box::new(Cursor::new(mmap)))
    }

    fn create(&self, name: &str, overwrite: bool) -> Result<Box<dyn Write + Send>, StorageError> {
        let path = self.path_of(name);
        if !overwrite && path.exists() {
            return Err(StorageError::AlreadyExists {
                storage: self.label.clone(),
                name: name.to_string(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(BufWriter::new(fs::File::create(path)?)))
    }

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.path_of(name).exists())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_of(name);
        if !path.exists() {
            return Err(self.not_found(name));
        }
        Ok(fs::remove_file(path)?)
    }
}
