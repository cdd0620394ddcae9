//! # BBB On Demand VM API client
//!
//! Rust bindings for the BBB On Demand REST API: provisioned
//! BigBlueButton instances, the meetings they host and the recordings they
//! store.
//!
//! Every operation is a stateless one-shot HTTP call. The client holds the
//! per-customer configuration, validates enumerated parameters locally and
//! delegates transmission to an [`HttpTransport`]. The default transport is
//! backed by reqwest; tests can inject a fake.
//!
//! ## Usage
//!
//! ```no_run
//! use bbbondemand::{
//!     ClientConfig, CreateInstanceRequest, InstanceFilters, MachineSize, OnDemandClient,
//! };
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("customer-id", "api-token", "secret");
//! let client = OnDemandClient::new(config)?;
//!
//! let instances = client.instances(InstanceFilters::new()).await?;
//! println!("instances: {instances}");
//!
//! let request = CreateInstanceRequest::new(MachineSize::Standard).region("us-east-1");
//! let created = client.create_instance(request).await?;
//! println!("created: {created}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Re-export commonly used items
pub use client::OnDemandClient;
pub use config::ClientConfig;
pub use errors::{OnDemandError, Result};
pub use transport::{ApiRequest, HttpTransport, ReqwestTransport, ReqwestTransportBuilder};
pub use types::{
    CreateInstanceRequest, InstanceFilters, MachineSize, MachineStatus, ManageRecordings,
};
