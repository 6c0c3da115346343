//! In-process transport for tests and embedding.
//!
//! Useful when stream events are produced inside the same process (test
//! fixtures, replay tooling, or an embedding application bridging its own
//! connection) rather than read from a network socket.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::sync::mpsc;

use super::{EventFrame, StreamEvent, TransportError, METRIC_EVENT, PING_EVENT};
use crate::store::MetricValue;

/// Producer handle for driving a [`MetricsStream`] by hand.
///
/// Dropping the handle closes the channel, which the stream treats as the
/// transport going away for good.
///
/// [`MetricsStream`]: crate::stream::MetricsStream
///
/// # Example
///
/// ```
/// use loadwatch::ChannelTransport;
///
/// # tokio_test::block_on(async {
/// let (transport, events) = ChannelTransport::create(16);
/// transport.open().await;
/// transport.metric("request.count", 42).await;
/// # });
/// ```
#[derive(Debug)]
pub struct ChannelTransport {
    tx: mpsc::Sender<StreamEvent>,
}

impl ChannelTransport {
    /// Create a transport pair: the handle and the receiver to hand to
    /// [`MetricsStream::spawn`](crate::stream::MetricsStream::spawn).
    pub fn create(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    /// Announce a (re)connection attempt.
    pub async fn connecting(&self) {
        self.send(StreamEvent::Connecting).await;
    }

    /// Announce an established connection.
    pub async fn open(&self) {
        self.send(StreamEvent::Opened).await;
    }

    /// Deliver a raw named event.
    pub async fn frame(&self, event: &str, data: impl Into<Vec<u8>>) {
        self.send(StreamEvent::Frame(EventFrame::new(event, data))).await;
    }

    /// Deliver a metric update, encoded exactly as the server emits it:
    /// base64 of UTF-8 JSON `{"key": ..., "value": ...}`.
    pub async fn metric(&self, key: &str, value: impl Into<MetricValue>) {
        let value: MetricValue = value.into();
        let payload = serde_json::json!({ "key": key, "value": value });
        let data = STANDARD.encode(payload.to_string());
        self.frame(METRIC_EVENT, data).await;
    }

    /// Deliver a liveness heartbeat.
    pub async fn ping(&self) {
        self.frame(PING_EVENT, Vec::new()).await;
    }

    /// Report a transport failure (the real transport would retry).
    pub async fn fail(&self) {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        self.send(StreamEvent::Error(TransportError::Io(err))).await;
    }

    /// Shut the transport down for good.
    pub async fn close(&self) {
        self.send(StreamEvent::Closed).await;
    }

    async fn send(&self, event: StreamEvent) {
        // Receiver gone means the stream was disposed; nothing to report.
        let _ = self.tx.send(event).await;
    }
}
