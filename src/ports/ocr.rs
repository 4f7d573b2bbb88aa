use std::path::Path;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Port for reading text out of a photographed or scanned document.
#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    /// Extract text from a staged image file.
    async fn extract(&self, image: &Path) -> Result<String, DomainError>;
}
