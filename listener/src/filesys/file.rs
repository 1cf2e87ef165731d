//! File operations

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::ListenerError;

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Parse the file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, ListenerError> {
        let bytes = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace the file with `value` rendered as pretty JSON
    pub async fn write_json<T: Serialize>(&self, value: &T) -> Result<(), ListenerError> {
        let mut contents = serde_json::to_vec_pretty(value)?;
        contents.push(b'\n');
        self.write_atomic(&contents).await
    }

    /// Write through a sibling temp file and rename it over the target, so
    /// readers never observe a partial file
    pub async fn write_atomic(&self, contents: &[u8]) -> Result<(), ListenerError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).await?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        let mut temp = fs::File::create(&temp_path).await?;
        temp.write_all(contents).await?;
        temp.sync_all().await?;
        drop(temp);

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
