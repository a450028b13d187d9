//! Command line configuration

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::Error;

/// Default port of the metrics endpoint
pub const DEFAULT_PORT: u16 = 8080;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON lines
    #[default]
    Json,
    /// Human readable text
    Text,
}

/// Publishes managed cluster capacity and provenance metrics for a hub cluster
#[derive(Parser, Debug)]
#[command(name = "clusterlifecycle-state-metrics", version, about, long_about = None)]
pub struct Cli {
    /// Address to serve metrics on
    #[arg(long, env = "METRICS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to serve metrics on
    #[arg(long, env = "METRICS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Namespaces to watch, comma separated (all namespaces when empty)
    #[arg(long, env = "WATCH_NAMESPACES", value_delimiter = ',')]
    pub namespaces: Vec<String>,

    /// Hub cluster ID; read from the ClusterVersion when unset
    #[arg(long, env = "HUB_CLUSTER_ID")]
    pub hub_cluster_id: Option<String>,

    /// Path to a kubeconfig; in-cluster or default config when unset
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

/// Validated collector configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Socket address of the metrics endpoint
    pub listen: SocketAddr,
    /// Namespaces to watch; empty means all
    pub namespaces: Vec<String>,
    /// Explicit hub cluster ID
    pub hub_cluster_id: Option<String>,
    /// Explicit kubeconfig path
    pub kubeconfig: Option<PathBuf>,
    /// Log output format
    pub log_format: LogFormat,
}

impl TryFrom<Cli> for CollectorConfig {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self, Error> {
        let ip: IpAddr = cli
            .host
            .parse()
            .map_err(|e| Error::config(format!("invalid --host '{}': {e}", cli.host)))?;

        let mut namespaces: Vec<String> = cli
            .namespaces
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty())
            .map(String::from)
            .collect();
        namespaces.sort();
        namespaces.dedup();

        let hub_cluster_id = cli
            .hub_cluster_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self {
            listen: SocketAddr::new(ip, cli.port),
            namespaces,
            hub_cluster_id,
            kubeconfig: cli.kubeconfig,
            log_format: cli.log_format,
        })
    }
}
