// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay source backed by a growing text file of board placements.

use super::{SnapshotSource, SourceError};
use async_trait::async_trait;
use cl_core::snapshot::START_PLACEMENT;
use std::path::PathBuf;
use tracing::debug;

/// Line-oriented file reader with truncation recovery.
///
/// The file is re-read on every poll rather than held open, so a writer
/// replacing it wholesale is picked up without coordination. The cursor
/// counts consumed bytes; a file shorter than the cursor means the
/// backing file was truncated or rewritten, and reading restarts from
/// the beginning.
pub struct FileSource {
    path: PathBuf,
    cursor: u64,
}

impl FileSource {
    /// Open a replay file, seeding a missing one with the standard start
    /// placement so a fresh board shows up immediately.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        if !tokio::fs::try_exists(&path).await? {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, format!("{START_PLACEMENT}\n")).await?;
        }
        Ok(Self { path, cursor: 0 })
    }

    async fn unread(&mut self) -> Result<Vec<u8>, SourceError> {
        let contents = tokio::fs::read(&self.path).await?;
        if (contents.len() as u64) < self.cursor {
            debug!(path = %self.path.display(), "replay file shrank, rewinding to start");
            self.cursor = 0;
        }
        Ok(contents[self.cursor as usize..].to_vec())
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn is_readable(&mut self) -> Result<bool, SourceError> {
        Ok(self.unread().await?.contains(&b'\n'))
    }

    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let unread = self.unread().await?;
        let Some(end) = unread.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        self.cursor += end as u64 + 1;
        let mut line = unread[..end].to_vec();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    async fn reset_buffer(&mut self) -> Result<(), SourceError> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        self.cursor = metadata.len();
        Ok(())
    }

    async fn close(&mut self) {}

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
