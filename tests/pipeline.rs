//! End-to-end pipeline tests
//!
//! Drive watch events through the collector into the metrics store and
//! scrape the router, with companions served from memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::DynamicObject;
use kube::runtime::watcher::Event;
use tower::ServiceExt;

use clusterlifecycle_state_metrics::collector::{ManagedClusterInfoCollector, WORKER_LABEL};
use clusterlifecycle_state_metrics::crd::{
    ClusterDeployment, ClusterDeploymentSpec, DistributionInfo, KubeVendor, ManagedCluster,
    ManagedClusterInfo, ManagedClusterInfoSpec, ManagedClusterInfoStatus, ManagedClusterSpec,
    ManagedClusterStatus, NodeStatus, OcpDistributionInfo,
};
use clusterlifecycle_state_metrics::metrics::{FamilyGenerator, MetricsStore};
use clusterlifecycle_state_metrics::server::metrics_router;
use clusterlifecycle_state_metrics::store::ResourceStore;
use clusterlifecycle_state_metrics::watch::{InfoEventHandler, InfoGenerators};
use clusterlifecycle_state_metrics::Error;

/// Companions held in memory, editable while the pipeline runs
#[derive(Default)]
struct MemoryStore {
    clusters: Mutex<HashMap<String, ManagedCluster>>,
    deployments: Mutex<HashMap<(String, String), ClusterDeployment>>,
}

impl MemoryStore {
    fn put_cluster(&self, cluster: ManagedCluster) {
        let name = cluster.metadata.name.clone().unwrap_or_default();
        self.clusters.lock().unwrap().insert(name, cluster);
    }

    fn put_deployment(&self, deployment: ClusterDeployment) {
        let namespace = deployment.metadata.namespace.clone().unwrap_or_default();
        let name = deployment.metadata.name.clone().unwrap_or_default();
        self.deployments
            .lock()
            .unwrap()
            .insert((namespace, name), deployment);
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get_managed_cluster(&self, name: &str) -> Result<Option<ManagedCluster>, Error> {
        Ok(self.clusters.lock().unwrap().get(name).cloned())
    }

    async fn get_cluster_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ClusterDeployment>, Error> {
        Ok(self
            .deployments
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

/// An info object as the watcher delivers it
fn info(name: &str, cluster_id: &str, vendor: &str, cloud: &str) -> DynamicObject {
    let mut info = ManagedClusterInfo::new(name, ManagedClusterInfoSpec::default());
    info.metadata.namespace = Some(name.to_string());
    info.status = Some(ManagedClusterInfoStatus {
        cluster_id: cluster_id.to_string(),
        kube_vendor: KubeVendor::from(vendor),
        cloud_vendor: cloud.to_string(),
        version: "v1.24.6".to_string(),
        distribution_info: DistributionInfo {
            type_: "OCP".to_string(),
            ocp: OcpDistributionInfo {
                version: "4.11.8".to_string(),
            },
        },
        node_list: vec![NodeStatus {
            name: "worker-0".to_string(),
            labels: BTreeMap::from([(WORKER_LABEL.to_string(), String::new())]),
        }],
    });
    serde_json::from_value(serde_json::to_value(info).unwrap()).unwrap()
}

fn cluster(name: &str, capacity: &[(&str, &str)]) -> ManagedCluster {
    let mut cluster = ManagedCluster::new(name, ManagedClusterSpec::default());
    cluster.status = Some(ManagedClusterStatus {
        capacity: capacity
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect(),
    });
    cluster
}

fn deployment(name: &str) -> ClusterDeployment {
    let mut deployment = ClusterDeployment::new(name, ClusterDeploymentSpec::default());
    deployment.metadata.namespace = Some(name.to_string());
    deployment
}

struct Pipeline {
    companions: Arc<MemoryStore>,
    store: Arc<MetricsStore>,
    handler: InfoEventHandler,
}

impl Pipeline {
    fn new() -> Self {
        let companions = Arc::new(MemoryStore::default());
        let collector = ManagedClusterInfoCollector::new("hub-7f3a", companions.clone());
        let collector = Arc::new(collector);
        let store = Arc::new(MetricsStore::new(vec![collector.descriptor().clone()]));
        let generators: InfoGenerators =
            vec![collector as Arc<dyn FamilyGenerator<ManagedClusterInfo>>];
        let handler = InfoEventHandler::new(generators, store.clone());
        Self {
            companions,
            store,
            handler,
        }
    }

    async fn send(&mut self, event: Event<DynamicObject>) {
        self.handler.handle(event).await;
    }

    async fn scrape(&self) -> String {
        let request = Request::builder()
            .method("GET")
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = metrics_router(self.store.clone())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

const OCP_CAPACITY: &[(&str, &str)] = &[
    ("cpu", "24"),
    ("cpu_worker", "12"),
    ("core", "12"),
    ("core_worker", "6"),
    ("socket", "3"),
    ("socket_worker", "2"),
];

/// Story: a fleet is listed, scraped, then one cluster is detached
///
/// A Hive-provisioned OpenShift cluster and an imported EKS cluster are
/// both published; the cluster whose ManagedCluster is missing is not. Once
/// the OpenShift cluster's info is deleted only the EKS sample remains.
#[tokio::test]
async fn story_fleet_is_published_and_detached() {
    let mut pipeline = Pipeline::new();
    let companions = pipeline.companions.clone();
    companions.put_cluster(cluster("ocp-prod", OCP_CAPACITY));
    companions.put_deployment(deployment("ocp-prod"));
    companions.put_cluster(cluster("eks-dev", &[("cpu", "8"), ("cpu_worker", "4")]));

    let ocp_prod = info("ocp-prod", "9c1d", "OpenShift", "Amazon");
    let eks_dev = info("eks-dev", "", "EKS", "Amazon");
    let orphan = info("orphan", "o1", "AKS", "Azure");
    pipeline.send(Event::Init).await;
    pipeline.send(Event::InitApply(ocp_prod.clone())).await;
    pipeline.send(Event::InitApply(eks_dev)).await;
    pipeline.send(Event::InitApply(orphan)).await;
    pipeline.send(Event::InitDone).await;

    let scraped = pipeline.scrape().await;
    assert!(scraped.starts_with(
        "# HELP acm_managed_cluster_info Managed cluster information\n\
         # TYPE acm_managed_cluster_info gauge\n"
    ));
    assert!(scraped.contains(
        "acm_managed_cluster_info{hub_cluster_id=\"hub-7f3a\",managed_cluster_id=\"9c1d\",\
         vendor=\"OpenShift\",cloud=\"Amazon\",version=\"4.11.8\",created_via=\"Hive\",\
         cpu=\"24\",cpu_worker=\"12\",core=\"12\",core_worker=\"6\",socket=\"3\",\
         socket_worker=\"2\"} 1\n"
    ));
    assert!(scraped.contains(
        "acm_managed_cluster_info{hub_cluster_id=\"hub-7f3a\",managed_cluster_id=\"eks-dev\",\
         vendor=\"EKS\",cloud=\"Amazon\",version=\"v1.24.6\",created_via=\"Other\",\
         cpu=\"8\",cpu_worker=\"4\",core=\"0\",core_worker=\"0\",socket=\"0\",\
         socket_worker=\"0\"} 1\n"
    ));
    assert!(!scraped.contains("managed_cluster_id=\"o1\""));
    assert_eq!(scraped.matches("acm_managed_cluster_info{").count(), 2);

    pipeline.send(Event::Delete(ocp_prod)).await;
    let scraped = pipeline.scrape().await;
    assert!(!scraped.contains("managed_cluster_id=\"9c1d\""));
    assert!(scraped.contains("managed_cluster_id=\"eks-dev\""));
}

/// Story: a cluster appears once its capacity is reported
///
/// The first notification arrives before the registration agent has
/// reported capacity and is held back; the next one publishes it.
#[tokio::test]
async fn story_cluster_appears_once_capacity_is_reported() {
    let mut pipeline = Pipeline::new();
    let companions = pipeline.companions.clone();
    companions.put_cluster(cluster("c1", &[]));

    let notification = info("c1", "c1-id", "AKS", "Azure");
    pipeline.send(Event::Apply(notification.clone())).await;
    assert!(!pipeline.scrape().await.contains("managed_cluster_id="));

    companions.put_cluster(cluster("c1", &[("cpu", "4"), ("cpu_worker", "2")]));
    pipeline.send(Event::Apply(notification)).await;

    let scraped = pipeline.scrape().await;
    assert!(scraped.contains("managed_cluster_id=\"c1-id\""));
    assert!(scraped.contains("cpu=\"4\""));
}

/// Story: clusters that vanished while the watch was down are pruned
#[tokio::test]
async fn story_relist_prunes_clusters_deleted_while_disconnected() {
    let mut pipeline = Pipeline::new();
    let companions = pipeline.companions.clone();
    for name in ["c1", "c2"] {
        companions.put_cluster(cluster(name, OCP_CAPACITY));
        let listed = info(name, &format!("{name}-id"), "GKE", "Google");
        pipeline.send(Event::Apply(listed)).await;
    }
    assert_eq!(pipeline.store.len(), 2);

    pipeline.send(Event::Init).await;
    let listed = info("c2", "c2-id", "GKE", "Google");
    pipeline.send(Event::InitApply(listed)).await;
    pipeline.send(Event::InitDone).await;

    let scraped = pipeline.scrape().await;
    assert!(!scraped.contains("managed_cluster_id=\"c1-id\""));
    assert!(scraped.contains("managed_cluster_id=\"c2-id\""));
}
