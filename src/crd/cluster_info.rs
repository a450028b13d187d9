//! ManagedClusterInfo view
//!
//! The hub-side record holding registration and status facts (vendor,
//! cloud, version, nodes) about a managed cluster. It lives in the
//! namespace named after the cluster.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{DistributionInfo, KubeVendor, NodeStatus};

/// Specification for a ManagedClusterInfo
///
/// Only read for completeness; the collector relies on the status.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "internal.open-cluster-management.io",
    version = "v1beta1",
    kind = "ManagedClusterInfo",
    plural = "managedclusterinfos",
    status = "ManagedClusterInfoStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterInfoSpec {
    /// API server endpoint of the managed cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_endpoint: Option<String>,
}

/// Status for a ManagedClusterInfo
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterInfoStatus {
    /// Cluster identifier reported by the managed cluster (may be empty)
    #[serde(default, rename = "clusterID")]
    pub cluster_id: String,

    /// Kubernetes distribution vendor
    #[serde(default)]
    #[schemars(with = "String")]
    pub kube_vendor: KubeVendor,

    /// Cloud vendor (e.g., "Amazon", "Azure")
    #[serde(default)]
    pub cloud_vendor: String,

    /// Generic Kubernetes version
    #[serde(default)]
    pub version: String,

    /// Distribution-specific information
    #[serde(default)]
    pub distribution_info: DistributionInfo,

    /// Nodes of the managed cluster
    #[serde(default)]
    pub node_list: Vec<NodeStatus>,
}

impl ManagedClusterInfo {
    /// Status of this info object, or an empty status if none was reported
    pub fn status_or_default(&self) -> std::borrow::Cow<'_, ManagedClusterInfoStatus> {
        match &self.status {
            Some(status) => std::borrow::Cow::Borrowed(status),
            None => std::borrow::Cow::Owned(ManagedClusterInfoStatus::default()),
        }
    }
}
