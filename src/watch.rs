//! ManagedClusterInfo list/watch
//!
//! Every info notification re-runs the registered family generators and
//! replaces the object's samples in the [`MetricsStore`]. Deletes drop the
//! samples, and a re-list prunes objects that vanished while the watch was
//! down. Events of one watch are handled one at a time.
//!
//! Objects are watched untyped and decoded one by one, so a single object
//! that does not decode is skipped instead of failing the whole list.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::api::{Api, DynamicObject};
use kube::discovery::ApiResource;
use kube::runtime::watcher::{self, Event};
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, info, warn};

use crate::crd::ManagedClusterInfo;
use crate::metrics::{FamilyGenerator, MetricsStore};
use crate::store::decode;

/// Delay before polling a watch again after an error
pub const WATCH_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Generators producing samples for a ManagedClusterInfo
pub type InfoGenerators = Vec<Arc<dyn FamilyGenerator<ManagedClusterInfo>>>;

/// Store key of a watched object
pub fn object_key<K: Resource>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

/// Applies watch events of one watch to the metrics store
pub struct InfoEventHandler {
    generators: InfoGenerators,
    store: Arc<MetricsStore>,
    /// Key prefix owned by this watch ("" for all namespaces)
    scope: String,
    /// Keys seen since the last `Init`, while a re-list is in progress
    relisted: Option<HashSet<String>>,
}

impl InfoEventHandler {
    /// Handler for a watch over all namespaces
    pub fn new(generators: InfoGenerators, store: Arc<MetricsStore>) -> Self {
        Self {
            generators,
            store,
            scope: String::new(),
            relisted: None,
        }
    }

    /// Handler for a watch restricted to one namespace
    pub fn for_namespace(
        generators: InfoGenerators,
        store: Arc<MetricsStore>,
        namespace: &str,
    ) -> Self {
        Self {
            scope: format!("{namespace}/"),
            ..Self::new(generators, store)
        }
    }

    /// Apply one watch event
    pub async fn handle(&mut self, event: Event<DynamicObject>) {
        match event {
            Event::Init => {
                debug!(scope = %self.scope, "re-list started");
                self.relisted = Some(HashSet::new());
            }
            Event::InitApply(obj) => {
                if let Some(key) = self.refresh(obj).await {
                    if let Some(seen) = self.relisted.as_mut() {
                        seen.insert(key);
                    }
                }
            }
            Event::InitDone => {
                if let Some(seen) = self.relisted.take() {
                    let pruned = self.store.retain(&self.scope, &seen);
                    info!(
                        scope = %self.scope,
                        objects = seen.len(),
                        pruned,
                        "re-list complete"
                    );
                }
            }
            Event::Apply(obj) => {
                self.refresh(obj).await;
            }
            Event::Delete(obj) => {
                let key = object_key(&obj);
                if self.store.remove(&key) {
                    debug!(%key, "ManagedClusterInfo deleted, samples dropped");
                }
            }
        }
    }

    /// Regenerate the samples of one object
    ///
    /// Returns the object's key, or `None` when it could not be decoded.
    /// An undecodable object loses any samples it had.
    async fn refresh(&self, obj: DynamicObject) -> Option<String> {
        let key = object_key(&obj);
        let info = match decode::<ManagedClusterInfo>(obj) {
            Ok(info) => info,
            Err(e) => {
                warn!(%key, error = %e, "skipping undecodable ManagedClusterInfo");
                self.store.remove(&key);
                return None;
            }
        };

        let mut families = Vec::with_capacity(self.generators.len());
        for generator in &self.generators {
            families.push(generator.generate_family(&info).await);
        }
        self.store.upsert(key.clone(), &families);
        Some(key)
    }
}

/// Watch one info API until the stream ends
pub async fn watch_infos(api: Api<DynamicObject>, mut handler: InfoEventHandler) {
    let stream = watcher::watcher(api, watcher::Config::default());
    let mut stream = std::pin::pin!(stream);

    while let Some(event) = stream.next().await {
        match event {
            Ok(event) => handler.handle(event).await,
            Err(e) => {
                warn!(error = %e, "ManagedClusterInfo watcher error, will retry");
                tokio::time::sleep(WATCH_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Watch ManagedClusterInfo objects in `namespaces`, or everywhere when empty
///
/// Each namespace gets its own watch and handler so a re-list of one
/// namespace never prunes another's samples.
pub async fn run(
    client: Client,
    namespaces: &[String],
    generators: InfoGenerators,
    store: Arc<MetricsStore>,
) {
    let resource = ApiResource::erase::<ManagedClusterInfo>(&());

    if namespaces.is_empty() {
        info!("watching ManagedClusterInfo in all namespaces");
        let handler = InfoEventHandler::new(generators, store);
        watch_infos(Api::all_with(client, &resource), handler).await;
        return;
    }

    info!(?namespaces, "watching ManagedClusterInfo in selected namespaces");
    let watches = namespaces.iter().map(|ns| {
        let handler = InfoEventHandler::for_namespace(generators.clone(), store.clone(), ns);
        watch_infos(Api::namespaced_with(client.clone(), ns, &resource), handler)
    });
    futures::future::join_all(watches).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ManagedClusterInfoCollector;
    use crate::crd::{
        KubeVendor, ManagedCluster, ManagedClusterInfoSpec, ManagedClusterInfoStatus,
        ManagedClusterSpec, ManagedClusterStatus,
    };
    use crate::metrics::FamilyDescriptor;
    use crate::store::MockResourceStore;
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    fn info(namespace: &str, name: &str) -> ManagedClusterInfo {
        let mut info = ManagedClusterInfo::new(name, ManagedClusterInfoSpec::default());
        info.metadata.namespace = Some(namespace.to_string());
        info.status = Some(ManagedClusterInfoStatus {
            cluster_id: format!("{name}-id"),
            kube_vendor: KubeVendor::from("AKS"),
            cloud_vendor: "Azure".to_string(),
            version: "v1.24.6".to_string(),
            ..Default::default()
        });
        info
    }

    /// The info object as the watcher delivers it
    fn dynamic(info: &ManagedClusterInfo) -> DynamicObject {
        serde_json::from_value(serde_json::to_value(info).unwrap()).unwrap()
    }

    fn listed(namespace: &str, name: &str) -> DynamicObject {
        dynamic(&info(namespace, name))
    }

    /// An info object whose node list is not a list
    fn malformed(namespace: &str, name: &str) -> DynamicObject {
        serde_json::from_value(serde_json::json!({
            "apiVersion": "internal.open-cluster-management.io/v1beta1",
            "kind": "ManagedClusterInfo",
            "metadata": { "name": name, "namespace": namespace },
            "spec": {},
            "status": { "clusterID": format!("{name}-id"), "nodeList": "oops" }
        }))
        .unwrap()
    }

    fn cluster(name: &str) -> ManagedCluster {
        let mut cluster = ManagedCluster::new(name, ManagedClusterSpec::default());
        cluster.status = Some(ManagedClusterStatus {
            capacity: BTreeMap::from([("cpu".to_string(), Quantity("4".to_string()))]),
        });
        cluster
    }

    fn handler_for(scope: Option<&str>) -> (InfoEventHandler, Arc<MetricsStore>) {
        let mut resources = MockResourceStore::new();
        resources
            .expect_get_managed_cluster()
            .returning(|name| Ok(Some(cluster(name))));
        resources
            .expect_get_cluster_deployment()
            .returning(|_, _| Ok(None));

        let collector = ManagedClusterInfoCollector::new("hub", Arc::new(resources));
        let collector = Arc::new(collector);
        let descriptors: Vec<FamilyDescriptor> = vec![collector.descriptor().clone()];
        let store = Arc::new(MetricsStore::new(descriptors));
        let generators: InfoGenerators =
            vec![collector as Arc<dyn FamilyGenerator<ManagedClusterInfo>>];

        let handler = match scope {
            Some(ns) => InfoEventHandler::for_namespace(generators, store.clone(), ns),
            None => InfoEventHandler::new(generators, store.clone()),
        };
        (handler, store)
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key(&info("c1", "c1")), "c1/c1");
        assert_eq!(object_key(&listed("ns", "c2")), "ns/c2");
    }

    #[tokio::test]
    async fn test_apply_then_delete() {
        let (mut handler, store) = handler_for(None);

        handler.handle(Event::Apply(listed("c1", "c1"))).await;
        let rendered = store.render().unwrap();
        assert_eq!(store.len(), 1);
        assert!(rendered.contains("managed_cluster_id=\"c1-id\""));

        handler.handle(Event::Delete(listed("c1", "c1"))).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_relist_prunes_vanished_objects() {
        let (mut handler, store) = handler_for(None);
        handler.handle(Event::Apply(listed("c1", "c1"))).await;
        handler.handle(Event::Apply(listed("c2", "c2"))).await;

        handler.handle(Event::Init).await;
        handler.handle(Event::InitApply(listed("c2", "c2"))).await;
        handler.handle(Event::InitDone).await;

        let rendered = store.render().unwrap();
        assert_eq!(store.len(), 1);
        assert!(rendered.contains("managed_cluster_id=\"c2-id\""));
        assert!(!rendered.contains("managed_cluster_id=\"c1-id\""));
    }

    #[tokio::test]
    async fn test_namespaced_relist_leaves_other_namespaces() {
        let (mut handler, store) = handler_for(Some("c2"));
        store.upsert("c1/c1", &[]);

        handler.handle(Event::Init).await;
        handler.handle(Event::InitApply(listed("c2", "c2"))).await;
        handler.handle(Event::InitDone).await;

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_incomplete_update_clears_previous_sample() {
        let (mut handler, store) = handler_for(None);
        handler.handle(Event::Apply(listed("c1", "c1"))).await;

        let mut incomplete = info("c1", "c1");
        if let Some(status) = incomplete.status.as_mut() {
            status.cloud_vendor.clear();
        }
        handler.handle(Event::Apply(dynamic(&incomplete))).await;

        assert_eq!(store.len(), 1);
        assert!(!store.render().unwrap().contains("managed_cluster_id="));
    }

    /// One undecodable object in a re-list does not hold back the others
    #[tokio::test]
    async fn test_undecodable_object_is_skipped_during_relist() {
        let (mut handler, store) = handler_for(None);
        handler.handle(Event::Apply(listed("c1", "c1"))).await;

        let broken = malformed("c1", "c1");
        handler.handle(Event::Init).await;
        handler.handle(Event::InitApply(broken)).await;
        handler.handle(Event::InitApply(listed("c2", "c2"))).await;
        handler.handle(Event::InitDone).await;

        let rendered = store.render().unwrap();
        assert_eq!(store.len(), 1);
        assert!(rendered.contains("managed_cluster_id=\"c2-id\""));
        assert!(!rendered.contains("managed_cluster_id=\"c1-id\""));
    }

    #[tokio::test]
    async fn test_undecodable_update_drops_stale_sample() {
        let (mut handler, store) = handler_for(None);
        handler.handle(Event::Apply(listed("c1", "c1"))).await;
        handler.handle(Event::Apply(listed("c2", "c2"))).await;

        handler.handle(Event::Apply(malformed("c1", "c1"))).await;

        let rendered = store.render().unwrap();
        assert_eq!(store.len(), 1);
        assert!(!rendered.contains("managed_cluster_id=\"c1-id\""));
    }
}
