//! Completeness gate
//!
//! A sample with missing dimensions is worse than no sample, so a cluster
//! is only published once every label can be filled.

use crate::crd::KubeVendor;

/// Fields the gate inspects
#[derive(Clone, Copy, Debug)]
pub struct GateInput<'a> {
    /// Resolved managed cluster ID
    pub cluster_id: &'a str,
    /// Kubernetes vendor
    pub kube_vendor: &'a KubeVendor,
    /// Cloud vendor
    pub cloud_vendor: &'a str,
    /// Resolved distribution version
    pub version: &'a str,
    /// Total CPU
    pub cpu: i64,
    /// Worker CPU
    pub cpu_worker: i64,
    /// Whether any node carries the worker role
    pub has_worker: bool,
}

/// Returns true when the cluster has enough information to publish
///
/// Worker CPU of zero is legitimate on compact clusters without worker
/// nodes, but stale when worker nodes exist.
pub fn is_complete(input: &GateInput<'_>) -> bool {
    !(input.cluster_id.is_empty()
        || input.kube_vendor.is_unknown()
        || input.cloud_vendor.is_empty()
        || input.version.is_empty()
        || input.cpu == 0
        || (input.cpu_worker == 0 && input.has_worker))
}
