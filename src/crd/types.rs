//! Supporting types for the managed cluster resource views

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kubernetes distribution vendor reported for a managed cluster
///
/// Only OpenShift changes how other fields are read, so every other
/// vendor is carried verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum KubeVendor {
    /// Vendor not reported yet
    #[default]
    Unknown,
    /// Red Hat OpenShift
    OpenShift,
    /// Any other vendor (AKS, EKS, GKE, IKS, Other, ...)
    Other(String),
}

impl KubeVendor {
    /// Wire value for OpenShift
    pub const OPENSHIFT: &'static str = "OpenShift";

    /// Returns true for OpenShift clusters
    pub fn is_openshift(&self) -> bool {
        matches!(self, Self::OpenShift)
    }

    /// Returns true when no vendor has been reported
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Label value for this vendor (empty when unknown)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::OpenShift => Self::OPENSHIFT,
            Self::Other(vendor) => vendor,
        }
    }
}

impl From<String> for KubeVendor {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Self::Unknown,
            Self::OPENSHIFT => Self::OpenShift,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for KubeVendor {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl Serialize for KubeVendor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KubeVendor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(Self::from).unwrap_or_default())
    }
}

impl std::fmt::Display for KubeVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the managed cluster as reported in the info status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Node name
    #[serde(default)]
    pub name: String,

    /// Node labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl NodeStatus {
    /// Returns true if the node carries the given label key, whatever its value
    pub fn has_label(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }
}

/// Distribution-specific information
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionInfo {
    /// Distribution type (e.g., "OCP")
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_: String,

    /// OpenShift distribution details
    #[serde(default)]
    pub ocp: OcpDistributionInfo,
}

/// OpenShift distribution details
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OcpDistributionInfo {
    /// OpenShift version (e.g., "4.10.2")
    #[serde(default)]
    pub version: String,
}
