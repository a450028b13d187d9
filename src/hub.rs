//! Hub cluster identity
//!
//! Every sample carries the ID of the hub it was collected on. On an
//! OpenShift hub this is `spec.clusterID` of the `ClusterVersion` named
//! `version`; other hubs must supply it explicitly.

use kube::api::{Api, DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::Client;
use tracing::info;

use crate::retry::{retry_with_backoff, RetryConfig};
use crate::Error;

/// Name of the singleton ClusterVersion object
pub const CLUSTER_VERSION_NAME: &str = "version";

/// ApiResource for `config.openshift.io/v1` ClusterVersion
pub fn cluster_version_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk("config.openshift.io", "v1", "ClusterVersion");
    ApiResource::from_gvk_with_plural(&gvk, "clusterversions")
}

/// Extract a non-empty `spec.clusterID` from a ClusterVersion
pub fn cluster_id_from_cluster_version(obj: &DynamicObject) -> Option<String> {
    obj.data
        .pointer("/spec/clusterID")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(String::from)
}

/// Resolve the hub cluster ID
///
/// An explicit override wins. Otherwise the ClusterVersion is read,
/// retrying transient failures; a missing ClusterVersion is a
/// configuration error because nothing else identifies the hub.
pub async fn resolve_hub_cluster_id(
    client: &Client,
    override_id: Option<&str>,
    retry: &RetryConfig,
) -> Result<String, Error> {
    if let Some(id) = override_id.filter(|id| !id.is_empty()) {
        info!(hub_cluster_id = %id, "using configured hub cluster id");
        return Ok(id.to_string());
    }

    let api: Api<DynamicObject> = Api::all_with(client.clone(), &cluster_version_resource());
    let api = &api;
    let version = retry_with_backoff(
        retry,
        "get_cluster_version",
        || async move { api.get(CLUSTER_VERSION_NAME).await.map_err(Error::from) },
        |e| !e.is_not_found(),
    )
    .await
    .map_err(|e| {
        if e.is_not_found() {
            Error::config(
                "ClusterVersion 'version' not found; pass --hub-cluster-id on non-OpenShift hubs",
            )
        } else {
            e
        }
    })?;

    let id = cluster_id_from_cluster_version(&version)
        .ok_or_else(|| Error::config("ClusterVersion 'version' has no spec.clusterID"))?;
    info!(hub_cluster_id = %id, "resolved hub cluster id from ClusterVersion");
    Ok(id)
}
