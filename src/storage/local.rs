// ABOUTME: Filesystem object storage rooted at PRIVATE_OBJECT_DIR
// ABOUTME: Keeps a JSON metadata sidecar per object and resolves public search paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{validate_object_path, ObjectMetadata, ObjectStorage};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const METADATA_SUFFIX: &str = ".meta.json";

/// Object storage on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    /// Create storage rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to create object directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, object_path: &str) -> AppResult<PathBuf> {
        validate_object_path(object_path)?;
        Ok(self.root.join(object_path))
    }

    fn metadata_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(
        &self,
        object_path: &str,
        bytes: Bytes,
        metadata: &ObjectMetadata,
    ) -> AppResult<()> {
        let path = self.resolve(object_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        tokio::fs::write(Self::metadata_path(&path), serde_json::to_vec(metadata)?).await?;
        debug!(object_path, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, object_path: &str) -> AppResult<(Bytes, ObjectMetadata)> {
        let path = self.resolve(object_path)?;
        let bytes = tokio::fs::read(&path).await?;
        let metadata = serde_json::from_slice(&tokio::fs::read(Self::metadata_path(&path)).await?)?;
        Ok((Bytes::from(bytes), metadata))
    }

    async fn delete(&self, object_path: &str) -> AppResult<()> {
        let path = self.resolve(object_path)?;
        for target in [Self::metadata_path(&path), path] {
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Find `object_path` under the first public search path that has it
///
/// # Errors
///
/// Returns `INVALID_INPUT` for traversal attempts
pub async fn find_public_object(
    search_paths: &[PathBuf],
    object_path: &str,
) -> AppResult<Option<PathBuf>> {
    validate_object_path(object_path)?;
    for base in search_paths {
        let candidate = base.join(object_path);
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
