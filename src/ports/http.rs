use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::DomainError;

/// HTTP client port for all network requests.
/// All inference traffic must go through this interface.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request with JSON body and deserialize the JSON response.
    async fn post_json<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<R, DomainError>;

    /// Check if requests to non-loopback hosts are currently blocked.
    fn is_network_blocked(&self) -> bool;

    /// Get the list of allowed domains (when not in local-only mode).
    fn allowed_domains(&self) -> Vec<String>;
}
