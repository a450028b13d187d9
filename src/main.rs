//! clusterlifecycle-state-metrics - managed cluster metrics for a hub cluster

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use clusterlifecycle_state_metrics::collector::ManagedClusterInfoCollector;
use clusterlifecycle_state_metrics::config::{Cli, CollectorConfig};
use clusterlifecycle_state_metrics::crd::ManagedClusterInfo;
use clusterlifecycle_state_metrics::hub::resolve_hub_cluster_id;
use clusterlifecycle_state_metrics::metrics::{FamilyGenerator, MetricsStore};
use clusterlifecycle_state_metrics::retry::RetryConfig;
use clusterlifecycle_state_metrics::store::KubeResourceStore;
use clusterlifecycle_state_metrics::{server, telemetry, watch};

/// Attempts made to read the hub identity before giving up
const HUB_ID_ATTEMPTS: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CollectorConfig::try_from(Cli::parse())?;
    telemetry::init_logging(config.log_format)?;

    let client = kube_client(config.kubeconfig.as_deref()).await?;
    let hub_cluster_id = resolve_hub_cluster_id(
        &client,
        config.hub_cluster_id.as_deref(),
        &RetryConfig::with_max_attempts(HUB_ID_ATTEMPTS),
    )
    .await?;

    let resources = Arc::new(KubeResourceStore::new(client.clone()));
    let collector = Arc::new(ManagedClusterInfoCollector::new(hub_cluster_id, resources));
    let store = Arc::new(MetricsStore::new(vec![collector.descriptor().clone()]));
    let generators: watch::InfoGenerators =
        vec![collector as Arc<dyn FamilyGenerator<ManagedClusterInfo>>];

    tokio::select! {
        _ = watch::run(client, &config.namespaces, generators, store.clone()) => {
            tracing::warn!("ManagedClusterInfo watch ended");
        }
        result = server::serve(config.listen, store) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    tracing::info!("clusterlifecycle-state-metrics shutting down");
    Ok(())
}

/// Build a client from an explicit kubeconfig, or the default chain
async fn kube_client(kubeconfig: Option<&Path>) -> anyhow::Result<Client> {
    let Some(path) = kubeconfig else {
        return Ok(Client::try_default().await?);
    };

    let kubeconfig = Kubeconfig::read_from(path)
        .map_err(|e| anyhow::anyhow!("failed to read kubeconfig {}: {e}", path.display()))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    Ok(Client::try_from(config)?)
}
