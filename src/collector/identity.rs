//! Cluster identity and version extraction from ManagedClusterInfo

use kube::ResourceExt;

use crate::crd::{ManagedClusterInfo, ManagedClusterInfoStatus};

/// Resolve the managed cluster ID
///
/// Prefers the reported cluster ID. Non-OpenShift clusters without one
/// fall back to the cluster name; OpenShift always reports a real ID once
/// registered, so an empty one stays empty.
pub fn resolve_cluster_id(info: &ManagedClusterInfo) -> String {
    let status = info.status_or_default();
    if status.cluster_id.is_empty() && !status.kube_vendor.is_openshift() {
        return info.name_any();
    }
    status.cluster_id.clone()
}

/// Resolve the distribution version for the reported vendor
///
/// OpenShift publishes its version under the distribution info; every
/// other vendor uses the generic version field. No vendor, no version.
pub fn resolve_version(info: &ManagedClusterInfo) -> String {
    version_for(&info.status_or_default())
}

fn version_for(status: &ManagedClusterInfoStatus) -> String {
    if status.kube_vendor.is_unknown() {
        return String::new();
    }
    if status.kube_vendor.is_openshift() {
        status.distribution_info.ocp.version.clone()
    } else {
        status.version.clone()
    }
}
