//! Read-only access to the companion resources of a managed cluster
//!
//! Records are fetched untyped and decoded into their typed views here, so
//! the collector never touches raw objects. A missing object is `Ok(None)`,
//! not an error.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject};
use kube::discovery::ApiResource;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::trace;

#[cfg(test)]
use mockall::automock;

use crate::crd::{ClusterDeployment, ManagedCluster};
use crate::Error;

/// Trait abstracting the fetches the collector performs
///
/// This trait allows mocking the Kubernetes API in tests while using the
/// real client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Get the cluster-scoped ManagedCluster with the given name
    async fn get_managed_cluster(&self, name: &str) -> Result<Option<ManagedCluster>, Error>;

    /// Get the ClusterDeployment with the given name in the given namespace
    async fn get_cluster_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterDeployment>, Error>;
}

/// Real Kubernetes implementation
pub struct KubeResourceStore {
    client: Client,
}

impl KubeResourceStore {
    /// Create a new KubeResourceStore wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch<K>(&self, namespace: Option<&str>, name: &str) -> Result<Option<K>, Error>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        let api_resource = ApiResource::erase::<K>(&());
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        };

        match api.get_opt(name).await? {
            Some(obj) => decode::<K>(obj).map(Some),
            None => {
                trace!(kind = %api_resource.kind, name = %name, "object not found");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn get_managed_cluster(&self, name: &str) -> Result<Option<ManagedCluster>, Error> {
        self.fetch(None, name).await
    }

    async fn get_cluster_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterDeployment>, Error> {
        self.fetch(Some(namespace), name).await
    }
}

/// Decode an untyped object into its typed view
pub fn decode<K>(obj: DynamicObject) -> Result<K, Error>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    let kind = K::kind(&()).to_string();
    let name = obj.metadata.name.clone().unwrap_or_default();

    let value =
        serde_json::to_value(&obj).map_err(|e| Error::decode(&kind, &name, e.to_string()))?;
    serde_json::from_value(value).map_err(|e| Error::decode(kind, name, e.to_string()))
}
