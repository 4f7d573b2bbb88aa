use std::path::Path;

use crate::domain::{DomainError, MediaBlob};

/// Media written to request-scoped storage so a capability can read it by path.
///
/// The staged file is removed when the value is released or dropped.
pub trait StagedMedia: Send + Sync {
    fn path(&self) -> &Path;

    /// Remove the staged file now, reporting failures instead of ignoring them.
    fn release(self: Box<Self>) -> Result<(), DomainError>;
}

/// Port for staging uploaded media for capability calls.
pub trait MediaStager: Send + Sync {
    fn stage(&self, blob: &MediaBlob, suffix: &str) -> Result<Box<dyn StagedMedia>, DomainError>;
}
