//! Directory operations

use std::path::PathBuf;

use tokio::fs;

use crate::errors::ListenerError;
use crate::filesys::file::File;

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A file below this directory; `name` may contain subdirectories
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Remove the directory tree. Missing directories are fine.
    pub async fn delete(&self) -> Result<(), ListenerError> {
        match fs::remove_dir_all(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Create a fresh, uniquely named directory under the system temp dir
    pub async fn create_temp_dir(prefix: &str) -> Result<Dir, ListenerError> {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).await?;
        Ok(Dir::new(path))
    }
}
