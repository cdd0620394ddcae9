//! HTTP transport seam and the default reqwest-backed implementation
//!
//! The client builds an [`ApiRequest`] for every operation and hands it to
//! an [`HttpTransport`]. Swapping the transport for a fake is the intended
//! way to test code that drives the client without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::debug;

use crate::errors::{OnDemandError, Result};

/// A fully specified API request, ready for transmission.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute request URL
    pub url: String,
    /// Query parameters; values are already filtered for emptiness
    pub query: Vec<(&'static str, String)>,
    /// Request headers
    pub headers: Vec<(&'static str, String)>,
    /// JSON payload for write methods
    pub body: Option<Value>,
}

/// Transmits an [`ApiRequest`] and yields the parsed response body.
///
/// Implementations must be safe for concurrent use by multiple in-flight
/// calls; connection pooling, retries and TLS live behind this trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request, returning the response body on success.
    async fn execute(&self, request: ApiRequest) -> Result<Value>;
}

/// Default transport backed by reqwest, with timeout and bounded retry of
/// transient failures.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl ReqwestTransport {
    /// Start building a transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns [`OnDemandError::Config`] if the underlying client cannot be
    /// constructed.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn build_request(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            debug!(
                attempt = attempt + 1,
                method = %request.method,
                url = %request.url,
                "sending HTTP request"
            );

            match self.build_request(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(
                        attempt = attempt + 1,
                        url = %request.url,
                        %status,
                        "received HTTP response"
                    );

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    if !status.is_success() {
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "unknown error".to_string());
                        return Err(OnDemandError::Api { status: status.as_u16(), message });
                    }

                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|err| OnDemandError::Network(err.to_string()))?;
                    if bytes.is_empty() {
                        return Ok(Value::Null);
                    }
                    return serde_json::from_slice(&bytes)
                        .map_err(|err| OnDemandError::Decode(err.to_string()));
                }
                Err(err) => {
                    debug!(
                        attempt = attempt + 1,
                        url = %request.url,
                        error = %err,
                        "HTTP request failed"
                    );

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(OnDemandError::Network(err.to_string()));
                }
            }
        }

        Err(OnDemandError::Network(
            "http transport exhausted retries without producing a result".into(),
        ))
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
        }
    }
}

impl ReqwestTransportBuilder {
    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Base delay for exponential backoff between retries.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    /// Returns [`OnDemandError::Config`] if the reqwest client cannot be
    /// constructed.
    pub fn build(self) -> Result<ReqwestTransport> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(|err| {
                OnDemandError::Config(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(ReqwestTransport {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    fn transport_with_defaults() -> ReqwestTransport {
        ReqwestTransport::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(3)
            .build()
            .expect("transport")
    }

    fn get_request(url: String) -> ApiRequest {
        ApiRequest {
            method: Method::GET,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn returns_parsed_body_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let body = transport.execute(get_request(server.uri())).await.expect("body");

        assert_eq!(body, json!({"Status": "OK"}));
    }

    #[tokio::test]
    async fn empty_success_body_parses_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let body = transport.execute(get_request(server.uri())).await.expect("body");

        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn transmits_query_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("Region", "us-east"))
            .and(header("APITOKEN", "token-1"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let request = ApiRequest {
            method: Method::POST,
            url: server.uri(),
            query: vec![("Region", "us-east".to_string())],
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("APITOKEN", "token-1".to_string()),
            ],
            body: Some(json!({"InstanceId": "inst-1"})),
        };

        transport.execute(request).await.expect("response");

        let received = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body, json!({"InstanceId": "inst-1"}));
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let body = transport.execute(get_request(server.uri())).await.expect("body");

        assert_eq!(body, json!({"ok": true}));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such instance"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let err = transport.execute(get_request(server.uri())).await.expect_err("api error");

        match err {
            OnDemandError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such instance");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_server_errors_surface_as_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("transport");
        let err = transport.execute(get_request(server.uri())).await.expect_err("api error");

        assert!(matches!(err, OnDemandError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn network_failures_surface_as_network_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let transport = ReqwestTransport::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("transport");
        let err = transport
            .execute(get_request(format!("http://{addr}")))
            .await
            .expect_err("network error");

        assert!(matches!(err, OnDemandError::Network(_)));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let transport = transport_with_defaults();
        let err = transport.execute(get_request(server.uri())).await.expect_err("decode error");

        assert!(matches!(err, OnDemandError::Decode(_)));
    }
}
