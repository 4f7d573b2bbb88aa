use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::{DomainError, MediaBlob};
use crate::ports::{MediaStager, StagedMedia};

const STAGING_PREFIX: &str = "arogya-";

/// Stages uploads as named temporary files, deleted when released or dropped.
pub struct TempMediaStager {
    dir: Option<PathBuf>,
}

impl TempMediaStager {
    /// Stage into the OS temporary directory.
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Stage into a specific directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

impl Default for TempMediaStager {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStager for TempMediaStager {
    fn stage(&self, blob: &MediaBlob, suffix: &str) -> Result<Box<dyn StagedMedia>, DomainError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX).suffix(suffix);

        let mut file = match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };

        file.write_all(blob.bytes())?;
        file.flush()?;

        debug!(path = ?file.path(), bytes = blob.len(), "Media staged");
        Ok(Box::new(TempStagedMedia { file }))
    }
}

/// A staged temporary file. Dropping it deletes the file.
pub struct TempStagedMedia {
    file: NamedTempFile,
}

impl StagedMedia for TempStagedMedia {
    fn path(&self) -> &Path {
        self.file.path()
    }

    fn release(self: Box<Self>) -> Result<(), DomainError> {
        let path = self.file.path().to_path_buf();
        self.file.close().map_err(|e| {
            warn!(path = ?path, error = %e, "Failed to remove staged media");
            DomainError::from(e)
        })?;
        debug!(path = ?path, "Staged media removed");
        Ok(())
    }
}
