use crate::domain::ports::ArtifactStore;
use crate::utils::error::{Result, ShimError};
use std::path::PathBuf;

/// Reads artifacts from a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    base_path: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Absolute paths are used as given.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl ArtifactStore for LocalArtifactStore {
    async fn read_artifact(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tracing::debug!("Reading artifact {}", full_path.display());

        tokio::fs::read(&full_path)
            .await
            .map_err(|e| ShimError::artifact(full_path.display().to_string(), e.to_string()))
    }
}
