//! Typed views of the resources joined by the collector
//!
//! None of these are owned by this crate; they are read-only views of
//! resources reconciled by other controllers on the hub.

mod cluster_deployment;
mod cluster_info;
mod managed_cluster;
mod types;

pub use cluster_deployment::{ClusterDeployment, ClusterDeploymentSpec};
pub use cluster_info::{ManagedClusterInfo, ManagedClusterInfoSpec, ManagedClusterInfoStatus};
pub use managed_cluster::{ManagedCluster, ManagedClusterSpec, ManagedClusterStatus};
pub use types::{DistributionInfo, KubeVendor, NodeStatus, OcpDistributionInfo};
