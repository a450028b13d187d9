//! The `acm_managed_cluster_info` record and its labels

use crate::metrics::{FamilyDescriptor, Metric};

use super::capacity::Capacity;

/// Family name of the managed cluster info metric
pub const CLUSTER_INFO_NAME: &str = "acm_managed_cluster_info";

/// Help text of the managed cluster info metric
pub const CLUSTER_INFO_HELP: &str = "Managed cluster information";

/// Label keys, in exposition order
pub const CLUSTER_INFO_LABELS: [&str; 12] = [
    "hub_cluster_id",
    "managed_cluster_id",
    "vendor",
    "cloud",
    "version",
    "created_via",
    "cpu",
    "cpu_worker",
    "core",
    "core_worker",
    "socket",
    "socket_worker",
];

/// Descriptor of the managed cluster info family
pub fn cluster_info_descriptor() -> FamilyDescriptor {
    FamilyDescriptor::gauge(CLUSTER_INFO_NAME, CLUSTER_INFO_HELP)
}

/// How a managed cluster came to exist
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatedVia {
    /// Provisioned by Hive (a ClusterDeployment exists)
    Hive,
    /// Imported or created some other way
    Other,
}

impl CreatedVia {
    /// Label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hive => "Hive",
            Self::Other => "Other",
        }
    }
}

/// A validated managed cluster record, ready to publish
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterInfoRecord {
    /// Hub cluster ID
    pub hub_cluster_id: String,
    /// Managed cluster ID
    pub managed_cluster_id: String,
    /// Kubernetes vendor
    pub vendor: String,
    /// Cloud vendor
    pub cloud: String,
    /// Distribution version
    pub version: String,
    /// Provisioning path
    pub created_via: CreatedVia,
    /// Capacity counts
    pub capacity: Capacity,
}

impl ClusterInfoRecord {
    /// The record as a presence sample (value 1), labels in
    /// [`CLUSTER_INFO_LABELS`] order
    pub fn into_metric(self) -> Metric {
        let c = self.capacity;
        let values = [
            self.hub_cluster_id,
            self.managed_cluster_id,
            self.vendor,
            self.cloud,
            self.version,
            self.created_via.as_str().to_string(),
            c.cpu.to_string(),
            c.cpu_worker.to_string(),
            c.core.to_string(),
            c.core_worker.to_string(),
            c.socket.to_string(),
            c.socket_worker.to_string(),
        ];
        Metric::new(&CLUSTER_INFO_LABELS, values, 1.0)
    }
}
