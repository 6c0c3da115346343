//! Server-sent-event transport.
//!
//! Parses `text/event-stream` framing from an async byte stream and
//! forwards each named event to the [`MetricsStream`]:
//!
//! ```text
//! event: metric-update
//! data: eyJrZXkiOiJyZXF1ZXN0LmNvdW50IiwidmFsdWUiOjQyfQ==
//! <blank line dispatches the frame>
//! ```
//!
//! Multi-line `data:` fields are joined with `\n`, `:` comment lines are
//! skipped, and a frame without an `event:` field gets the protocol default
//! name `message`.
//!
//! [`MetricsStream`]: crate::stream::MetricsStream

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{EventFrame, StreamEvent, TransportError};

/// Default event name per the SSE protocol.
const DEFAULT_EVENT: &str = "message";

/// Transport reading SSE frames from a connection.
pub struct SseTransport;

impl SseTransport {
    /// Read frames from an already-established connection until EOF.
    ///
    /// Spawns a background task; the returned receiver is handed to
    /// [`MetricsStream::spawn`](crate::stream::MetricsStream::spawn).
    /// EOF or a read error ends the transport (no retry); use
    /// [`connect`](SseTransport::connect) for a self-healing connection.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::Cursor;
    /// use loadwatch::SseTransport;
    ///
    /// # tokio_test::block_on(async {
    /// let body = "event: ping\ndata:\n\n";
    /// let events = SseTransport::spawn(Cursor::new(body.as_bytes().to_vec()));
    /// # });
    /// ```
    pub fn spawn<R>(reader: R) -> mpsc::Receiver<StreamEvent>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let _ = tx.send(StreamEvent::Connecting).await;
            let _ = tx.send(StreamEvent::Opened).await;

            let mut reader = BufReader::new(reader);
            match read_frames(&mut reader, &tx).await {
                Ok(()) => {
                    let _ = tx.send(StreamEvent::Closed).await;
                }
                Err(err) => {
                    let _ = tx.send(StreamEvent::Error(err)).await;
                    let _ = tx.send(StreamEvent::Closed).await;
                }
            }
        });

        rx
    }

    /// Connect to `addr` over TCP and keep the subscription alive,
    /// retrying with a fixed delay after every failure or EOF.
    ///
    /// The retry loop ends only when the receiving stream is dropped.
    pub fn connect(addr: String, retry: Duration) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            loop {
                if tx.send(StreamEvent::Connecting).await.is_err() {
                    return;
                }
                match TcpStream::connect(&addr).await {
                    Ok(stream) => {
                        info!("connected to {addr}");
                        if tx.send(StreamEvent::Opened).await.is_err() {
                            return;
                        }
                        let mut reader = BufReader::new(stream);
                        let err = match read_frames(&mut reader, &tx).await {
                            Ok(()) => TransportError::Closed,
                            Err(err) => err,
                        };
                        warn!("stream from {addr} ended: {err}");
                        if tx.send(StreamEvent::Error(err)).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        debug!("connect to {addr} failed: {err}");
                        if tx.send(StreamEvent::Error(err.into())).await.is_err() {
                            return;
                        }
                    }
                }
                tokio::time::sleep(retry).await;
                if tx.is_closed() {
                    return;
                }
            }
        });

        rx
    }
}

/// Parse frames until EOF, forwarding each complete one.
///
/// Returns `Ok(())` on EOF or when the receiver goes away.
async fn read_frames<R>(
    reader: &mut BufReader<R>,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    let mut event = String::new();
    let mut data: Vec<u8> = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed.is_empty() {
            // Blank line dispatches the accumulated frame.
            if event.is_empty() && data.is_empty() {
                continue;
            }
            let name = if event.is_empty() {
                DEFAULT_EVENT.to_string()
            } else {
                std::mem::take(&mut event)
            };
            let frame = EventFrame::new(name, std::mem::take(&mut data));
            if tx.send(StreamEvent::Frame(frame)).await.is_err() {
                return Ok(());
            }
        } else if let Some(rest) = trimmed.strip_prefix("event:") {
            event = rest.trim_start().to_string();
        } else if let Some(rest) = trimmed.strip_prefix("data:") {
            if !data.is_empty() {
                data.push(b'\n');
            }
            data.extend_from_slice(rest.trim_start().as_bytes());
        } else if trimmed.starts_with(':') {
            // Comment / keep-alive line.
        } else {
            // Fields this stream does not use (id:, retry:).
            debug!("ignoring SSE field {trimmed:?}");
        }
    }
}
