//! Metric families and generators
//!
//! A family is a named, typed group of samples. Generators produce the
//! samples of one family for one watched object. Families convert to
//! `prometheus` protobuf families so the stock text encoder renders them.

use async_trait::async_trait;
use prometheus::proto;
use prometheus::{Encoder, TextEncoder};

use crate::Error;

/// Name and help text of a gauge family
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyDescriptor {
    /// Family name (e.g., "acm_managed_cluster_info")
    pub name: String,
    /// Help text
    pub help: String,
}

impl FamilyDescriptor {
    /// Create a gauge family descriptor
    pub fn gauge(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
        }
    }

    /// Protobuf family carrying this descriptor and no samples
    pub fn to_proto(&self) -> proto::MetricFamily {
        let mut family = proto::MetricFamily::default();
        family.set_name(self.name.clone());
        family.set_help(self.help.clone());
        family.set_field_type(proto::MetricType::GAUGE);
        family
    }
}

/// One labeled sample
///
/// Keys and values are stored as pairs so they cannot drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    /// Label key/value pairs in exposition order
    pub labels: Vec<(String, String)>,
    /// Sample value
    pub value: f64,
}

impl Metric {
    /// Build a sample from positionally matching keys and values
    pub fn new<V>(keys: &[&str], values: V, value: f64) -> Self
    where
        V: IntoIterator<Item = String>,
    {
        Self {
            labels: keys.iter().map(|k| k.to_string()).zip(values).collect(),
            value,
        }
    }

    /// Label keys in order
    pub fn label_keys(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(k, _)| k.as_str())
    }

    /// Label value for a key, if present
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Protobuf gauge sample, labels kept in order
    pub fn to_proto(&self) -> proto::Metric {
        let mut metric = proto::Metric::default();
        for (key, value) in &self.labels {
            let mut pair = proto::LabelPair::default();
            pair.set_name(key.clone());
            pair.set_value(value.clone());
            metric.mut_label().push(pair);
        }
        let mut gauge = proto::Gauge::default();
        gauge.set_value(self.value);
        metric.set_gauge(gauge);
        metric
    }
}

/// A family together with its samples
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFamily {
    /// Family descriptor
    pub descriptor: FamilyDescriptor,
    /// Samples of the family
    pub metrics: Vec<Metric>,
}

impl MetricFamily {
    /// Protobuf family with every sample
    pub fn to_proto(&self) -> proto::MetricFamily {
        let mut family = self.descriptor.to_proto();
        for metric in &self.metrics {
            family.mut_metric().push(metric.to_proto());
        }
        family
    }

    /// Text exposition of this family alone
    ///
    /// A family without samples renders as nothing.
    pub fn render(&self) -> Result<String, Error> {
        encode_text(&[self.to_proto()])
    }
}

/// Encode protobuf families in the text exposition format
///
/// Families without samples are skipped; the encoder rejects them.
pub fn encode_text(families: &[proto::MetricFamily]) -> Result<String, Error> {
    let families: Vec<proto::MetricFamily> = families
        .iter()
        .filter(|f| !f.get_metric().is_empty())
        .cloned()
        .collect();

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::encode(e.to_string()))
}

/// Produces the samples of one family for a watched object
///
/// Returning no samples is how a generator suppresses an object.
#[async_trait]
pub trait FamilyGenerator<K: Send + Sync>: Send + Sync {
    /// Descriptor of the family this generator fills
    fn descriptor(&self) -> &FamilyDescriptor;

    /// Samples for the given object
    async fn generate(&self, obj: &K) -> Vec<Metric>;

    /// Samples wrapped in their family
    async fn generate_family(&self, obj: &K) -> MetricFamily {
        MetricFamily {
            descriptor: self.descriptor().clone(),
            metrics: self.generate(obj).await,
        }
    }
}
