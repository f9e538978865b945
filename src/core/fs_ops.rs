// src/core/fs_ops.rs
//! File system helpers for the database and log locations.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    /// Create the directory (and parents) unless it already exists.
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() || path.exists() {
            return Ok(());
        }

        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        app_log!(info, "Created directory: {}", path.display());
        Ok(())
    }

    /// Resolve a relative path against the current working directory.
    pub fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }
}
