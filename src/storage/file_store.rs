use crate::{
    error::Result,
    storage::{validate_key, KeyValueStore},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based store: one JSON file per key under a root directory
pub struct FileStore {
    root_path: PathBuf,
}

impl FileStore {
    const BOARD_DIR: &'static str = ".backlog";

    /// Creates a store under `<project_root>/.backlog`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::BOARD_DIR),
        }
    }

    /// Creates a store rooted directly at `dir`
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            root_path: dir.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn key_file(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root_path.join(format!("{}.json", key)))
    }

    async fn ensure_directory_exists(&self) -> Result<()> {
        if !fs::try_exists(&self.root_path).await? {
            fs::create_dir_all(&self.root_path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.key_file(key)?;

        if !fs::try_exists(&file_path).await? {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(contents))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.key_file(key)?;
        self.ensure_directory_exists().await?;

        // Write-then-rename so a reader never sees a half-written payload
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;

        debug!(key, bytes = value.len(), "FileStore::set");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.key_file(key)?;

        if fs::try_exists(&file_path).await? {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }
}
