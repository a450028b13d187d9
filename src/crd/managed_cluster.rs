//! ManagedCluster view
//!
//! Cluster-scoped registration object keyed by the cluster name. The
//! collector reads the capacity map from its status.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a ManagedCluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1",
    kind = "ManagedCluster",
    plural = "managedclusters",
    status = "ManagedClusterStatus",
    namespaced = false
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    /// Whether the hub accepts the cluster's registration
    #[serde(default)]
    pub hub_accepts_client: bool,
}

/// Status for a ManagedCluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterStatus {
    /// Capacity by resource kind (cpu, cpu_worker, core, core_worker, socket, socket_worker, ...)
    #[serde(default)]
    pub capacity: BTreeMap<String, Quantity>,
}

impl ManagedCluster {
    /// Capacity quantity for a resource kind, if reported
    pub fn capacity(&self, resource: &str) -> Option<&Quantity> {
        self.status.as_ref()?.capacity.get(resource)
    }
}
