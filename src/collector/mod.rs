//! Managed cluster info collector
//!
//! Joins a ManagedClusterInfo with its ManagedCluster and optional
//! ClusterDeployment into one `acm_managed_cluster_info` sample. Every
//! failure degrades to "no sample for this cluster": a broken cluster
//! must never stop collection for the rest of the fleet.
//!
//! Pipeline per notification:
//! 1. fetch the ManagedCluster (cluster-scoped, same name) - abort on failure
//! 2. look up the ClusterDeployment (namespace and name = cluster name)
//! 3. resolve cluster ID and version
//! 4. derive capacity and the worker-node flag
//! 5. apply the completeness gate
//! 6. build the record

mod capacity;
mod gate;
mod identity;
mod record;

use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use tracing::{debug, error, info, instrument, warn};

pub use capacity::{
    derive_capacity, has_worker_node, quantity_value, Capacity, RESOURCE_CORE,
    RESOURCE_CORE_WORKER, RESOURCE_CPU, RESOURCE_CPU_WORKER, RESOURCE_SOCKET,
    RESOURCE_SOCKET_WORKER, WORKER_LABEL,
};
pub use gate::{is_complete, GateInput};
pub use identity::{resolve_cluster_id, resolve_version};
pub use record::{
    cluster_info_descriptor, ClusterInfoRecord, CreatedVia, CLUSTER_INFO_HELP,
    CLUSTER_INFO_LABELS, CLUSTER_INFO_NAME,
};

use crate::crd::ManagedClusterInfo;
use crate::metrics::{FamilyDescriptor, FamilyGenerator, Metric};
use crate::store::ResourceStore;

/// Outcome of the ClusterDeployment lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProvisioningLookup {
    /// A ClusterDeployment exists
    Found,
    /// No ClusterDeployment exists
    NotFound,
    /// The lookup failed for another reason
    Unavailable,
}

impl ProvisioningLookup {
    /// Provisioning path implied by this lookup
    ///
    /// A failed lookup is indistinguishable from absence for the metric.
    pub fn created_via(&self) -> CreatedVia {
        match self {
            Self::Found => CreatedVia::Hive,
            Self::NotFound | Self::Unavailable => CreatedVia::Other,
        }
    }
}

/// Generator for the `acm_managed_cluster_info` family
pub struct ManagedClusterInfoCollector {
    hub_cluster_id: String,
    store: Arc<dyn ResourceStore>,
    descriptor: FamilyDescriptor,
}

impl ManagedClusterInfoCollector {
    /// Create a collector publishing under the given hub cluster ID
    pub fn new(hub_cluster_id: impl Into<String>, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            hub_cluster_id: hub_cluster_id.into(),
            store,
            descriptor: cluster_info_descriptor(),
        }
    }

    /// Join the companions of an info object into a record
    ///
    /// Returns `None` when a companion cannot be fetched or the joined
    /// record is incomplete.
    #[instrument(skip(self, info), fields(cluster = %info.name_any()))]
    pub async fn on_info_changed(&self, info: &ManagedClusterInfo) -> Option<ClusterInfoRecord> {
        let name = info.name_any();
        debug!("joining managed cluster info");

        let cluster = match self.store.get_managed_cluster(&name).await {
            Ok(Some(cluster)) => cluster,
            Ok(None) => {
                warn!("ManagedCluster not found, skipping");
                return None;
            }
            Err(e) => {
                error!(error = %e, "failed to fetch ManagedCluster, skipping");
                return None;
            }
        };

        let created_via = self.lookup_provisioning(&name).await.created_via();

        let status = info.status_or_default();
        let cluster_id = resolve_cluster_id(info);
        let version = resolve_version(info);
        let capacity = derive_capacity(&cluster);
        let has_worker = has_worker_node(info);

        let gate = GateInput {
            cluster_id: &cluster_id,
            kube_vendor: &status.kube_vendor,
            cloud_vendor: &status.cloud_vendor,
            version: &version,
            cpu: capacity.cpu,
            cpu_worker: capacity.cpu_worker,
            has_worker,
        };

        if !is_complete(&gate) {
            info!(
                cluster_id = %cluster_id,
                kube_vendor = %status.kube_vendor,
                cloud_vendor = %status.cloud_vendor,
                version = %version,
                cpu = capacity.cpu,
                cpu_worker = capacity.cpu_worker,
                core = capacity.core,
                core_worker = capacity.core_worker,
                socket = capacity.socket,
                socket_worker = capacity.socket_worker,
                has_worker,
                "not enough information available, skipping"
            );
            return None;
        }

        let record = ClusterInfoRecord {
            hub_cluster_id: self.hub_cluster_id.clone(),
            managed_cluster_id: cluster_id,
            vendor: status.kube_vendor.to_string(),
            cloud: status.cloud_vendor.clone(),
            version,
            created_via,
            capacity,
        };
        debug!(?record, "managed cluster info record built");
        Some(record)
    }

    async fn lookup_provisioning(&self, name: &str) -> ProvisioningLookup {
        match self.store.get_cluster_deployment(name, name).await {
            Ok(Some(_)) => ProvisioningLookup::Found,
            Ok(None) => {
                info!("ClusterDeployment not found, created via other means");
                ProvisioningLookup::NotFound
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch ClusterDeployment, assuming other means");
                ProvisioningLookup::Unavailable
            }
        }
    }
}

#[async_trait]
impl FamilyGenerator<ManagedClusterInfo> for ManagedClusterInfoCollector {
    fn descriptor(&self) -> &FamilyDescriptor {
        &self.descriptor
    }

    async fn generate(&self, obj: &ManagedClusterInfo) -> Vec<Metric> {
        self.on_info_changed(obj)
            .await
            .map(ClusterInfoRecord::into_metric)
            .into_iter()
            .collect()
    }
}
