//! Long-lived metric stream subscription.
//!
//! A transport (SSE over TCP, or an in-process channel) delivers
//! [`StreamEvent`]s over a tokio mpsc channel; the [`MetricsStream`]
//! consumes them, tracks the connection lifecycle
//! (`Connecting -> Open -> (Error -> Connecting | Closed)`), and forwards
//! decoded `metric-update` frames into a [`MetricsStore`]. Reconnection is
//! the transport's business; the stream only reflects it as state.
//!
//! The store is never cleared on error or reconnect: stale values remain
//! the best available estimate until superseded.

mod channel;
mod sse;

pub use channel::ChannelTransport;
pub use sse::SseTransport;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::decode;
use crate::store::MetricsStore;

/// Event name carrying a metric update payload.
pub const METRIC_EVENT: &str = "metric-update";
/// Event name of the server's liveness heartbeat.
pub const PING_EVENT: &str = "ping";

/// One named event as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    /// Event name, e.g. `"metric-update"` or `"ping"`.
    pub event: String,
    /// Raw payload bytes (base64 text for metric updates).
    pub data: Vec<u8>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Transport-level failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying connection failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,
}

/// Lifecycle signal from a transport.
#[derive(Debug)]
pub enum StreamEvent {
    /// The transport is (re)establishing its connection.
    Connecting,
    /// The connection is established; frames will follow.
    Opened,
    /// One named event was received.
    Frame(EventFrame),
    /// The transport failed; it retries on its own.
    Error(TransportError),
    /// The transport shut down for good.
    Closed,
}

/// State of the logical subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Waiting for the transport to establish its connection.
    Connecting,
    /// Receiving events.
    Open,
    /// The transport reported a failure and is retrying.
    Error,
    /// Terminal: the transport is gone.
    Closed,
}

impl StreamState {
    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            StreamState::Connecting => "connecting",
            StreamState::Open => "live",
            StreamState::Error => "reconnecting",
            StreamState::Closed => "closed",
        }
    }
}

/// Connectivity information surfaced to the embedding layer.
///
/// The stream takes no action on staleness itself; the embedder decides
/// what "too long without a ping" means and how to surface it.
#[derive(Debug, Clone)]
pub struct StreamHealth {
    pub state: StreamState,
    /// When the last frame of any kind (including pings) arrived.
    pub last_event_at: Option<Instant>,
}

impl StreamHealth {
    /// True when connected but nothing (not even a ping) arrived within
    /// `window`.
    pub fn is_stale(&self, window: Duration) -> bool {
        match (self.state, self.last_event_at) {
            (StreamState::Open, Some(at)) => at.elapsed() > window,
            (StreamState::Open, None) => false,
            _ => false,
        }
    }
}

/// Forwards decoded metric updates from a transport into a store.
///
/// A forwarding agent, not a queryable object: its only data output is the
/// effect on the [`MetricsStore`]. Dropping it aborts the forwarding task.
///
/// # Example
///
/// ```
/// use loadwatch::{ChannelTransport, MetricsStore, MetricsStream};
///
/// # tokio_test::block_on(async {
/// let store = MetricsStore::new();
/// let (transport, events) = ChannelTransport::create(16);
/// let _stream = MetricsStream::spawn(events, store.clone());
///
/// transport.open().await;
/// transport.metric("request.count", 42).await;
/// # });
/// ```
#[derive(Debug)]
pub struct MetricsStream {
    task: JoinHandle<()>,
    health: watch::Receiver<StreamHealth>,
}

impl MetricsStream {
    /// Spawn a stream consuming `events` and merging updates into `store`.
    pub fn spawn(events: mpsc::Receiver<StreamEvent>, store: MetricsStore) -> Self {
        let (tx, rx) = watch::channel(StreamHealth {
            state: StreamState::Connecting,
            last_event_at: None,
        });
        let task = tokio::spawn(run(events, store, tx));
        Self { task, health: rx }
    }

    /// Current connectivity information.
    pub fn health(&self) -> StreamHealth {
        self.health.borrow().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.health.borrow().state
    }
}

impl Drop for MetricsStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut events: mpsc::Receiver<StreamEvent>,
    store: MetricsStore,
    health: watch::Sender<StreamHealth>,
) {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Connecting => {
                set_state(&health, StreamState::Connecting);
            }
            StreamEvent::Opened => {
                info!("metric stream open");
                set_state(&health, StreamState::Open);
            }
            StreamEvent::Frame(frame) => {
                touch(&health);
                handle_frame(&frame, &store);
            }
            StreamEvent::Error(err) => {
                warn!("metric stream transport error: {err}");
                set_state(&health, StreamState::Error);
            }
            StreamEvent::Closed => {
                info!("metric stream closed");
                set_state(&health, StreamState::Closed);
                return;
            }
        }
    }
    // Transport dropped without an explicit close.
    set_state(&health, StreamState::Closed);
}

fn handle_frame(frame: &EventFrame, store: &MetricsStore) {
    match frame.event.as_str() {
        METRIC_EVENT => match decode::decode(&frame.data) {
            Ok(update) => store.merge(update.key, update.value),
            // One bad frame must not disrupt the live view.
            Err(err) => warn!("dropping malformed metric frame: {err}"),
        },
        // Liveness only; receipt was already recorded.
        PING_EVENT => {}
        other => debug!("ignoring unknown stream event {other:?}"),
    }
}

fn set_state(health: &watch::Sender<StreamHealth>, state: StreamState) {
    health.send_modify(|h| h.state = state);
}

fn touch(health: &watch::Sender<StreamHealth>) {
    health.send_modify(|h| h.last_event_at = Some(Instant::now()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MetricValue;

    /// Let the forwarding task drain everything the transport sent.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn updates_land_in_the_store() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        transport.metric("request.count", 42).await;
        transport.metric("bytes.read.count", 1024).await;
        settle().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("request.count"), Some(&MetricValue::Integer(42)));
        assert_eq!(
            snapshot.get("bytes.read.count"),
            Some(&MetricValue::Integer(1024))
        );
        assert_eq!(stream.state(), StreamState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_frame_is_dropped_and_stream_continues() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let _stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        transport.metric("a", 1).await;
        transport.frame(METRIC_EVENT, "not-base64!!").await;
        transport.metric("b", 2).await;
        settle().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a"), Some(&MetricValue::Integer(1)));
        assert_eq!(snapshot.get("b"), Some(&MetricValue::Integer(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn ping_updates_liveness_without_touching_the_store() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        settle().await;
        assert!(stream.health().last_event_at.is_none());

        transport.ping().await;
        settle().await;

        assert!(store.is_empty());
        let health = stream.health();
        assert!(health.last_event_at.is_some());
        assert!(!health.is_stale(Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_does_not_clear_the_store() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        transport.metric("a", 1).await;
        transport.fail().await;
        settle().await;

        assert_eq!(stream.state(), StreamState::Error);
        // Stale values persist as "last known" until superseded.
        assert_eq!(store.snapshot().get("a"), Some(&MetricValue::Integer(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_cycles_through_connecting_to_open() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        transport.fail().await;
        settle().await;
        assert_eq!(stream.state(), StreamState::Error);

        // The transport retries on its own and announces the new attempt.
        transport.connecting().await;
        settle().await;
        assert_eq!(stream.state(), StreamState::Connecting);

        transport.open().await;
        transport.metric("a", 2).await;
        settle().await;
        assert_eq!(stream.state(), StreamState::Open);
        assert_eq!(store.snapshot().get("a"), Some(&MetricValue::Integer(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn close_is_terminal() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        transport.close().await;
        settle().await;

        assert_eq!(stream.state(), StreamState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_transport_closes_the_stream() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store.clone());

        transport.open().await;
        drop(transport);
        settle().await;

        assert_eq!(stream.state(), StreamState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn open_stream_goes_stale_without_pings() {
        let store = MetricsStore::new();
        let (transport, events) = ChannelTransport::create(16);
        let stream = MetricsStream::spawn(events, store);

        transport.open().await;
        transport.ping().await;
        settle().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(stream.health().is_stale(Duration::from_secs(10)));
    }
}
