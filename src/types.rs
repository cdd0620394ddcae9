//! Wire types for the BBB On Demand VM API
//!
//! The enumerated parameters are closed sets: anything outside them is
//! rejected locally before a request is built. Body structs carry the exact
//! field casing the vendor expects, including the `InstanceId` /
//! `InstanceID` divergence between the start and stop endpoints, which is
//! part of the external contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::OnDemandError;

/// Implements `as_str`, the `ALL` value set, `Display` and exact-match
/// `FromStr` for a wire enum. Parsing rejects anything outside the closed
/// set with [`OnDemandError::InvalidParameter`].
macro_rules! impl_wire_conversions {
    ($name:ident, $field:literal { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            /// Every member of the closed value set.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation of this value.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = OnDemandError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($str => Ok(Self::$variant),)+
                    other => Err(OnDemandError::InvalidParameter {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Compute tier selecting instance capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineSize {
    /// Smallest tier
    Small,
    /// Default tier
    Standard,
    /// Large tier
    Large,
    /// Extra-large tier
    Xlarge,
}

impl_wire_conversions!(MachineSize, "MachineSize" {
    Small => "small",
    Standard => "standard",
    Large => "large",
    Xlarge => "xlarge",
});

/// Whether recording management is enabled for an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManageRecordings {
    /// Recording management enabled
    True,
    /// Recording management disabled
    False,
    /// Either, when used as a listing filter
    Both,
}

impl_wire_conversions!(ManageRecordings, "ManageRecordings" {
    True => "true",
    False => "false",
    Both => "both",
});

/// Lifecycle status of an instance as reported by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MachineStatus {
    /// Instance is booting
    Starting,
    /// Instance is serving
    Available,
    /// Instance is shutting down
    Stopping,
    /// Instance is stopped
    Stopped,
    /// Instance has been deleted
    Deleted,
}

impl_wire_conversions!(MachineStatus, "Status" {
    Starting => "STARTING",
    Available => "AVAILABLE",
    Stopping => "STOPPING",
    Stopped => "STOPPED",
    Deleted => "DELETED",
});

/// Body for `POST /instances`.
///
/// Optional fields that were never set do not serialize, so the server only
/// receives keys the caller actually provided. Empty strings count as unset.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInstanceRequest {
    #[serde(rename = "MachineSize")]
    machine_size: MachineSize,
    #[serde(rename = "Region", skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(rename = "ManageRecordings", skip_serializing_if = "Option::is_none")]
    manage_recordings: Option<ManageRecordings>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    tags: Option<Map<String, Value>>,
    #[serde(rename = "CallBack", skip_serializing_if = "Option::is_none")]
    callback: Option<String>,
}

impl CreateInstanceRequest {
    /// Start a request for an instance of the given size.
    pub fn new(machine_size: MachineSize) -> Self {
        Self {
            machine_size,
            region: None,
            manage_recordings: None,
            tags: None,
            callback: None,
        }
    }

    /// Deployment region for the instance.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(region.into());
        self
    }

    /// Enable or disable recording management.
    pub fn manage_recordings(mut self, manage_recordings: ManageRecordings) -> Self {
        self.manage_recordings = Some(manage_recordings);
        self
    }

    /// Free-form tags attached to the instance.
    pub fn tags(mut self, tags: Map<String, Value>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Callback URL invoked by the vendor on instance events.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = non_empty(callback.into());
        self
    }
}

/// Body for `POST /instances/start`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StartInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

/// Body for `POST /instances/stop`.
///
/// The stop endpoint spells the key `InstanceID` while start uses
/// `InstanceId`; both spellings are what the server accepts.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StopInstanceRequest {
    #[serde(rename = "InstanceID")]
    pub instance_id: String,
}

/// Body for `POST /recordings/publish` and `POST /recordings/unpublish`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RecordingActionRequest {
    #[serde(rename = "RecordingID")]
    pub recording_id: String,
}

/// Query filters for listing instances.
///
/// Unset filters produce no query parameter at all.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilters {
    region: Option<String>,
    manage_recordings: Option<ManageRecordings>,
    status: Option<MachineStatus>,
}

impl InstanceFilters {
    /// No filtering; every instance is listed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a deployment region. Empty strings count as unset.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(region.into());
        self
    }

    /// Restrict by recording management setting.
    pub fn manage_recordings(mut self, manage_recordings: ManageRecordings) -> Self {
        self.manage_recordings = Some(manage_recordings);
        self
    }

    /// Restrict by lifecycle status.
    pub fn status(mut self, status: MachineStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(manage_recordings) = self.manage_recordings {
            query.push(("ManageRecordings", manage_recordings.as_str().to_string()));
        }
        if let Some(region) = &self.region {
            query.push(("Region", region.clone()));
        }
        if let Some(status) = self.status {
            query.push(("Status", status.as_str().to_string()));
        }
        query
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
