//! Last-known-value store for live metrics.
//!
//! The store keeps one value per metric key and replaces the whole mapping
//! on every update (copy-on-write), so a reader always sees a fully
//! consistent snapshot and never a partially applied merge.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An immutable point-in-time view of every metric the stream has delivered.
///
/// A key absent from the snapshot has never been observed, which is distinct
/// from a key carrying a zero value. Display layers must render absence as an
/// explicit unknown state.
pub type MetricsSnapshot = Arc<BTreeMap<String, MetricValue>>;

/// A single metric payload as delivered on the wire.
///
/// Values are opaque to the store: interpretation (byte formatting, labels)
/// is supplied by the display layer's lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Whole-number counter, the common case.
    Integer(i64),
    /// Fractional measurement.
    Float(f64),
    /// Free-form text value.
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Integer(value)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        MetricValue::Integer(value.into())
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

/// Holds the latest value per metric key.
///
/// The store is a cheap clonable handle; the stream task and the display
/// glue share one instance. All mutation goes through [`merge`] and
/// [`reset`], which swap in a freshly built map under a short write lock.
///
/// `merge` is last-write-wins per key: replaying the same `(key, value)`
/// pair is a no-op in effect, and merges for distinct keys commute.
///
/// [`merge`]: MetricsStore::merge
/// [`reset`]: MetricsStore::reset
///
/// # Example
///
/// ```
/// use loadwatch::{MetricsStore, MetricValue};
///
/// let store = MetricsStore::new();
/// store.merge("request.count", MetricValue::Integer(42));
///
/// let snapshot = store.snapshot();
/// assert_eq!(snapshot.get("request.count"), Some(&MetricValue::Integer(42)));
/// assert!(snapshot.get("session.count").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    current: Arc<RwLock<MetricsSnapshot>>,
}

impl MetricsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with one where `key` maps to `value`.
    ///
    /// Full-value replacement, never a partial merge of the value itself.
    pub fn merge(&self, key: impl Into<String>, value: MetricValue) {
        let mut current = self.current.write();
        let mut next = (**current).clone();
        next.insert(key.into(), value);
        *current = Arc::new(next);
    }

    /// The current snapshot.
    ///
    /// Safe to call concurrently with an in-flight `merge`; the returned
    /// mapping never changes after it is handed out.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.current.read().clone()
    }

    /// Clear all keys, reverting every metric to "never observed".
    ///
    /// This is a display-scope invalidation cue; it does not imply the
    /// server-side counters were reset.
    pub fn reset(&self) {
        *self.current.write() = Arc::new(BTreeMap::new());
    }

    /// Number of keys currently known.
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// True when no key has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_inserts_and_replaces() {
        let store = MetricsStore::new();

        store.merge("request.count", MetricValue::Integer(1));
        store.merge("request.count", MetricValue::Integer(2));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("request.count"),
            Some(&MetricValue::Integer(2))
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let store = MetricsStore::new();

        store.merge("bytes.read.count", MetricValue::Integer(1024));
        let once = store.snapshot();

        store.merge("bytes.read.count", MetricValue::Integer(1024));
        let twice = store.snapshot();

        assert_eq!(*once, *twice);
    }

    #[test]
    fn merges_commute_across_keys() {
        let ab = MetricsStore::new();
        ab.merge("a", MetricValue::Integer(1));
        ab.merge("b", MetricValue::Integer(2));

        let ba = MetricsStore::new();
        ba.merge("b", MetricValue::Integer(2));
        ba.merge("a", MetricValue::Integer(1));

        assert_eq!(*ab.snapshot(), *ba.snapshot());
    }

    #[test]
    fn absent_key_is_distinct_from_zero() {
        let store = MetricsStore::new();
        store.merge("session.count", MetricValue::Integer(0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("session.count"), Some(&MetricValue::Integer(0)));
        assert!(snapshot.get("request.count").is_none());
    }

    #[test]
    fn held_snapshot_is_unaffected_by_later_merges() {
        let store = MetricsStore::new();
        store.merge("a", MetricValue::Integer(1));

        let before = store.snapshot();
        store.merge("a", MetricValue::Integer(2));
        store.merge("b", MetricValue::Integer(3));

        assert_eq!(before.len(), 1);
        assert_eq!(before.get("a"), Some(&MetricValue::Integer(1)));
    }

    #[test]
    fn reset_yields_empty_snapshot() {
        let store = MetricsStore::new();
        store.merge("a", MetricValue::Integer(1));
        store.merge("b", MetricValue::Text("x".to_string()));

        store.reset();

        assert!(store.snapshot().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_the_same_state() {
        let store = MetricsStore::new();
        let handle = store.clone();

        handle.merge("a", MetricValue::Integer(7));

        assert_eq!(store.snapshot().get("a"), Some(&MetricValue::Integer(7)));
    }

    #[test]
    fn value_deserializes_from_number_or_string() {
        let int: MetricValue = serde_json::from_str("42").unwrap();
        assert_eq!(int, MetricValue::Integer(42));

        let float: MetricValue = serde_json::from_str("13.5").unwrap();
        assert_eq!(float, MetricValue::Float(13.5));

        let text: MetricValue = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(text, MetricValue::Text("idle".to_string()));
    }

    #[test]
    fn value_display_matches_wire_form() {
        assert_eq!(MetricValue::Integer(42).to_string(), "42");
        assert_eq!(MetricValue::Text("idle".into()).to_string(), "idle");
    }
}
