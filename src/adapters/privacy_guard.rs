use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::{Host, Url};

use crate::domain::config::PrivacyConfig;
use crate::domain::DomainError;
use crate::ports::HttpClient;

/// PrivacyGuard is the only way patient text leaves the process.
/// In local-only mode (default) just loopback hosts are reachable, so a
/// locally hosted inference server keeps working. When network access is
/// enabled, only whitelisted domains are allowed.
pub struct PrivacyGuard {
    client: Client,
    local_only: AtomicBool,
    allowed_domains: RwLock<Vec<String>>,
}

impl PrivacyGuard {
    /// Create a guard from the privacy section of the configuration.
    pub fn new(config: &PrivacyConfig, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .user_agent(format!("Arogya/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            local_only = config.local_only,
            allowed_domains = ?config.allowed_domains,
            "PrivacyGuard initialized"
        );

        Ok(Self {
            client,
            local_only: AtomicBool::new(config.local_only),
            allowed_domains: RwLock::new(config.allowed_domains.clone()),
        })
    }

    /// Set local-only mode.
    pub fn set_local_only(&self, local_only: bool) {
        let previous = self.local_only.swap(local_only, Ordering::SeqCst);
        if previous != local_only {
            info!(local_only, "PrivacyGuard mode changed");
        }
    }

    /// Update allowed domains.
    pub fn set_allowed_domains(&self, domains: Vec<String>) {
        let mut guard = self.allowed_domains.write();
        *guard = domains;
        info!(allowed_domains = ?*guard, "PrivacyGuard allowed domains updated");
    }

    fn is_loopback(host: &Host<&str>) -> bool {
        match host {
            Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
            Host::Ipv4(ip) => IpAddr::V4(*ip).is_loopback(),
            Host::Ipv6(ip) => IpAddr::V6(*ip).is_loopback(),
        }
    }

    /// Check if a URL is allowed based on current settings.
    fn is_url_allowed(&self, url: &str) -> Result<(), DomainError> {
        let parsed = Url::parse(url).map_err(|e| DomainError::HttpRequest(e.to_string()))?;
        let host = parsed
            .host()
            .ok_or_else(|| DomainError::HttpRequest("Invalid URL: no host".to_string()))?;

        if Self::is_loopback(&host) {
            debug!(url, "Loopback request allowed");
            return Ok(());
        }

        if self.local_only.load(Ordering::SeqCst) {
            warn!(url, "Network request blocked: local-only mode enabled");
            return Err(DomainError::NetworkBlocked {
                reason: "Local-only mode is enabled. Only loopback hosts are reachable.".to_string(),
            });
        }

        let host = host.to_string();
        let allowed = self.allowed_domains.read();
        if !allowed
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
        {
            warn!(url, host = %host, "Network request blocked: domain not in whitelist");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Domain '{}' is not in the allowed list", host),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl HttpClient for PrivacyGuard {
    async fn post_json<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<R, DomainError> {
        self.is_url_allowed(url)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::HttpRequest(format!(
                "HTTP {} for {}",
                status, url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))
    }

    fn is_network_blocked(&self) -> bool {
        self.local_only.load(Ordering::SeqCst)
    }

    fn allowed_domains(&self) -> Vec<String> {
        self.allowed_domains.read().clone()
    }
}
