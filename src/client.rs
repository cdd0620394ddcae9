//! Client for the BBB On Demand VM API
//!
//! Every public operation is a stateless one-shot call: validate typed
//! parameters, build an [`ApiRequest`], hand it to the transport, return
//! the parsed body. The [`OnDemandClient::request`] helper is the single
//! chokepoint all operations pass through, so auth-header injection and
//! response unwrapping behave identically everywhere.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{OnDemandError, Result};
use crate::transport::{ApiRequest, HttpTransport, ReqwestTransport};
use crate::types::{
    CreateInstanceRequest, InstanceFilters, RecordingActionRequest, StartInstanceRequest,
    StopInstanceRequest,
};

/// Client for one customer's slice of the BBB On Demand VM API.
///
/// Cheap to clone via the shared transport; safe for concurrent use. The
/// client itself performs no retries, queuing or rate-limiting; each call
/// maps to at most one transport dispatch.
pub struct OnDemandClient {
    config: ClientConfig,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl OnDemandClient {
    /// Create a client with the default [`ReqwestTransport`].
    ///
    /// # Errors
    /// Returns [`OnDemandError::Config`] when the configuration is unusable
    /// or the default transport cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(config, transport)
    }

    /// Create a client with an injected transport.
    ///
    /// Use this to share one transport across clients or to substitute a
    /// fake in tests.
    ///
    /// # Errors
    /// Returns [`OnDemandError::Config`] when the configuration is unusable.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url();

        Ok(Self { config, base_url, transport })
    }

    /// Redirect requests to an arbitrary base URL (for mock servers).
    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Dispatch a request through the transport.
    ///
    /// Attaches the `APITOKEN` and `Content-Type` headers, drops query
    /// parameters whose value is empty and returns the parsed response body
    /// unchanged. Transport failures propagate as-is.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "dispatching API request");

        let query = query.into_iter().filter(|(_, value)| !value.is_empty()).collect();
        let request = ApiRequest {
            method,
            url,
            query,
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("APITOKEN", self.config.api_token.clone()),
            ],
            body,
        };

        self.transport.execute(request).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, Vec::new(), None).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        let body = serde_json::to_value(body).map_err(|err| {
            OnDemandError::Internal(format!("failed to serialize request body: {err}"))
        })?;
        self.request(Method::POST, path, Vec::new(), Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, Vec::new(), None).await
    }

    /// Billing activity for the customer.
    pub async fn billing(&self) -> Result<Value> {
        self.get("/billing/activity").await
    }

    /// List instances, optionally narrowed by [`InstanceFilters`].
    pub async fn instances(&self, filters: InstanceFilters) -> Result<Value> {
        self.request(Method::GET, "/instances", filters.to_query(), None).await
    }

    /// Details of a single instance.
    pub async fn instance(&self, instance_id: &str) -> Result<Value> {
        self.get(&format!("/instances/{instance_id}")).await
    }

    /// Lifecycle history of an instance.
    pub async fn instance_history(&self, instance_id: &str) -> Result<Value> {
        self.get(&format!("/instances/{instance_id}/history")).await
    }

    /// Start a stopped instance.
    pub async fn start_instance(&self, instance_id: impl Into<String>) -> Result<Value> {
        let body = StartInstanceRequest { instance_id: instance_id.into() };
        self.post("/instances/start", &body).await
    }

    /// Stop a running instance.
    pub async fn stop_instance(&self, instance_id: impl Into<String>) -> Result<Value> {
        let body = StopInstanceRequest { instance_id: instance_id.into() };
        self.post("/instances/stop", &body).await
    }

    /// Provision a new instance.
    pub async fn create_instance(&self, request: CreateInstanceRequest) -> Result<Value> {
        self.post("/instances", &request).await
    }

    /// Delete an instance.
    pub async fn delete_instance(&self, instance_id: &str) -> Result<Value> {
        self.delete(&format!("/instances/{instance_id}")).await
    }

    /// Regions instances can be provisioned in.
    pub async fn regions(&self) -> Result<Value> {
        self.get("/regions").await
    }

    /// List meetings across the customer's instances.
    pub async fn meetings(&self) -> Result<Value> {
        self.get("/meetings").await
    }

    /// Details of a single meeting.
    pub async fn meeting(&self, meeting_id: &str) -> Result<Value> {
        self.get(&format!("/meetings/{meeting_id}")).await
    }

    /// List stored recordings.
    pub async fn recordings(&self) -> Result<Value> {
        self.get("/recordings").await
    }

    /// Details of a single recording.
    pub async fn recording(&self, recording_id: &str) -> Result<Value> {
        self.get(&format!("/recordings/{recording_id}")).await
    }

    /// Make a recording publicly available.
    pub async fn publish_recording(&self, recording_id: impl Into<String>) -> Result<Value> {
        let body = RecordingActionRequest { recording_id: recording_id.into() };
        self.post("/recordings/publish", &body).await
    }

    /// Withdraw a recording from public availability.
    pub async fn unpublish_recording(&self, recording_id: impl Into<String>) -> Result<Value> {
        let body = RecordingActionRequest { recording_id: recording_id.into() };
        self.post("/recordings/unpublish", &body).await
    }

    /// Delete a recording.
    pub async fn delete_recording(&self, recording_id: &str) -> Result<Value> {
        self.delete(&format!("/recordings/{recording_id}")).await
    }
}
