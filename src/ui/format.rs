//! Display metadata for metric keys.
//!
//! The store treats values as opaque; labels and formatting live here, in
//! the presentation layer's lookup table. Keys without an entry render
//! with their raw key and plain value.

use crate::store::MetricValue;

/// Placeholder for keys the stream has never delivered.
pub const UNKNOWN: &str = "--";

/// Display metadata for one known metric key.
pub struct MetricMeta {
    pub key: &'static str,
    pub label: &'static str,
    pub format: fn(&MetricValue) -> String,
}

/// The known dashboard metrics, in display order.
pub const METRIC_META: &[MetricMeta] = &[
    MetricMeta {
        key: "bytes.write.count",
        label: "Total Bytes written",
        format: format_bytes,
    },
    MetricMeta {
        key: "bytes.read.count",
        label: "Total Bytes read",
        format: format_bytes,
    },
    MetricMeta {
        key: "request.count",
        label: "Total Requests",
        format: format_plain,
    },
    MetricMeta {
        key: "session.count",
        label: "Active Sessions",
        format: format_plain,
    },
];

/// Look up display metadata for a key.
pub fn meta_for(key: &str) -> Option<&'static MetricMeta> {
    METRIC_META.iter().find(|m| m.key == key)
}

/// Render the value as-is.
pub fn format_plain(value: &MetricValue) -> String {
    value.to_string()
}

/// Render a byte count with 1024-based units and two decimals.
pub fn format_bytes(value: &MetricValue) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let bytes = match value {
        MetricValue::Integer(v) => *v as f64,
        MetricValue::Float(v) => *v,
        MetricValue::Text(v) => return v.clone(),
    };
    if bytes <= 0.0 {
        return "0 B".to_string();
    }

    let exponent = (bytes.log2() / 10.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes / 1024f64.powi(exponent as i32);
    format!("{:.2} {}", scaled, UNITS[exponent])
}
