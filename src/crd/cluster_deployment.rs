//! ClusterDeployment view
//!
//! Created by Hive when it provisions a cluster, in the namespace named
//! after the cluster. Only its existence matters to the collector.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a ClusterDeployment
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeployment",
    plural = "clusterdeployments",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentSpec {
    /// Name of the provisioned cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Base DNS domain of the provisioned cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_domain: Option<String>,
}
