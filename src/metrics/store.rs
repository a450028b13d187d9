//! Per-object sample store
//!
//! Each watched object owns the samples of every registered family.
//! Upserts replace an object's samples wholesale and deletes drop them.
//! A scrape merges everything into one protobuf family per registered
//! family and encodes it as text.

use std::collections::HashSet;

use dashmap::DashMap;
use prometheus::proto;

use super::family::{encode_text, FamilyDescriptor, Metric, MetricFamily};
use crate::Error;

/// Samples of one object, one entry per registered family
type ObjectSamples = Vec<Vec<Metric>>;

/// Concurrent store of samples keyed by object
pub struct MetricsStore {
    families: Vec<FamilyDescriptor>,
    objects: DashMap<String, ObjectSamples>,
}

impl MetricsStore {
    /// Create a store for the given families, in exposition order
    pub fn new(families: Vec<FamilyDescriptor>) -> Self {
        Self {
            families,
            objects: DashMap::new(),
        }
    }

    /// Replace the samples of an object
    ///
    /// Families are matched to registered descriptors by name; registered
    /// families missing from `families` get no samples.
    pub fn upsert(&self, key: impl Into<String>, families: &[MetricFamily]) {
        let samples = self
            .families
            .iter()
            .map(|descriptor| {
                families
                    .iter()
                    .find(|f| f.descriptor.name == descriptor.name)
                    .map(|f| f.metrics.clone())
                    .unwrap_or_default()
            })
            .collect();
        self.objects.insert(key.into(), samples);
    }

    /// Drop the samples of an object, returning true if it was present
    pub fn remove(&self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    /// Drop every object under `prefix` whose key is not in `live`
    ///
    /// Used after a re-list: objects that were not listed again have been
    /// deleted while the watch was down. Keys outside `prefix` belong to
    /// other watches and are left alone.
    pub fn retain(&self, prefix: &str, live: &HashSet<String>) -> usize {
        let before = self.objects.len();
        self.objects
            .retain(|key, _| !key.starts_with(prefix) || live.contains(key));
        before - self.objects.len()
    }

    /// Number of objects with stored samples
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no object has stored samples
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// One protobuf family per registered family
    ///
    /// Samples are ordered by object key so repeated scrapes of an
    /// unchanged store are byte-identical.
    pub fn gather(&self) -> Vec<proto::MetricFamily> {
        let mut entries: Vec<(String, ObjectSamples)> = self
            .objects
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        self.families
            .iter()
            .enumerate()
            .map(|(i, descriptor)| {
                let mut family = descriptor.to_proto();
                for (_, samples) in &entries {
                    for metric in samples.get(i).into_iter().flatten() {
                        family.mut_metric().push(metric.to_proto());
                    }
                }
                family
            })
            .collect()
    }

    /// Render the full exposition text
    pub fn render(&self) -> Result<String, Error> {
        encode_text(&self.gather())
    }
}
