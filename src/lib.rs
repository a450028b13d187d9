//! clusterlifecycle-state-metrics - managed cluster metrics for a hub cluster
//!
//! Watches `ManagedClusterInfo` objects on the hub, joins each with its
//! `ManagedCluster` and optional `ClusterDeployment`, and publishes one
//! `acm_managed_cluster_info` gauge sample per fully described cluster.
//!
//! # Modules
//!
//! - [`crd`] - Typed views of the joined resources
//! - [`store`] - Point lookups of companion resources
//! - [`collector`] - The join, capacity derivation and completeness gate
//! - [`metrics`] - Metric families, generators and the scrape-side store
//! - [`watch`] - ManagedClusterInfo list/watch feeding the store
//! - [`server`] - `/metrics` and `/healthz` endpoint
//! - [`hub`] - Hub cluster identity
//! - [`config`] - Command line configuration
//! - [`telemetry`] - Logging setup
//! - [`retry`] - Backoff for startup calls
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod collector;
pub mod config;
pub mod crd;
pub mod error;
pub mod hub;
pub mod metrics;
pub mod retry;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod watch;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
