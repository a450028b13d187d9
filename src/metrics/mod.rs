//! Metric families, generators and the scrape-side store

mod family;
mod store;

pub use family::{encode_text, FamilyDescriptor, FamilyGenerator, Metric, MetricFamily};
pub use store::MetricsStore;

/// Content type of the text exposition format
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;
