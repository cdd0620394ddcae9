//! Per-customer client configuration

use crate::errors::{OnDemandError, Result};

const DEFAULT_DOMAIN: &str = "bbbondemand.com";
const DEFAULT_API_PATH: &str = "/api";
const DEFAULT_API_VERSION: &str = "v1";

/// Immutable configuration for [`crate::OnDemandClient`].
///
/// Carries the customer's credential set and the pieces of the API base
/// URL. Domain, API path and API version default to the hosted service and
/// can be overridden for staging environments.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Customer identifier embedded in every request path
    pub customer_id: String,
    /// Token sent as the `APITOKEN` header
    pub api_token: String,
    /// Customer secret issued alongside the token. No current endpoint
    /// consumes it; carried for parity with the vendor's credential set.
    pub secret: String,
    /// API host, without scheme
    pub domain: String,
    /// Path prefix, with leading slash
    pub api_path: String,
    /// API version segment
    pub api_version: String,
}

impl ClientConfig {
    /// Create a configuration for the hosted service.
    pub fn new(
        customer_id: impl Into<String>,
        api_token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            api_token: api_token.into(),
            secret: secret.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the API host.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Override the API path prefix.
    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Override the API version segment.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Base URL every request path is joined onto.
    pub fn base_url(&self) -> String {
        format!(
            "https://{}{}/{}/{}/vm",
            self.domain, self.api_path, self.api_version, self.customer_id
        )
    }

    /// Check that the configuration can produce usable requests.
    ///
    /// # Errors
    /// Returns [`OnDemandError::Config`] when a required identifier is empty
    /// or the derived base URL does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.is_empty() {
            return Err(OnDemandError::Config("customer id must not be empty".into()));
        }
        if self.api_token.is_empty() {
            return Err(OnDemandError::Config("API token must not be empty".into()));
        }

        let base_url = self.base_url();
        url::Url::parse(&base_url)
            .map_err(|e| OnDemandError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        Ok(())
    }
}
