//! # loadwatch
//!
//! An operator dashboard for live server metrics and transient
//! notifications.
//!
//! The server pushes named events over a long-lived streaming channel;
//! this crate aggregates them into a point-in-time snapshot of named
//! counters and manages the timed lifecycle of toast notifications, both
//! rendered by a terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ transport ──▶ MetricsStream ──▶ decode ──▶ MetricsStore        │
//! │ (SSE/channel)   (lifecycle)                (snapshot)  ──▶ ui  │
//! │                                                                │
//! │ any component ──▶ NotificationBus ──▶ ToastQueue       ──▶ ui  │
//! │                     (fan-in)           (timed lifecycle)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`stream`]**: transports delivering named events ([`SseTransport`],
//!   [`ChannelTransport`]) and the [`MetricsStream`] that translates their
//!   lifecycle into store updates
//! - **[`decode`]**: wire-format decoding (base64 of UTF-8 JSON)
//! - **[`store`]**: copy-on-write last-known-value snapshot
//! - **[`bus`]**/**[`toast`]**: fan-in notification channel and the queue
//!   driving each toast through its show/fade/remove lifecycle
//! - **[`app`]**/**[`ui`]**: dashboard glue and ratatui rendering
//!
//! Both pipelines are push-in / pull-out: producers push state changes and
//! the display layer pulls current snapshots to re-render.
//!
//! ## Usage
//!
//! ```
//! use loadwatch::{
//!     ChannelTransport, MetricsStore, MetricsStream, NotificationBus, ToastQueue,
//!     ToastTimings,
//! };
//!
//! # tokio_test::block_on(async {
//! let store = MetricsStore::new();
//! let (transport, events) = ChannelTransport::create(16);
//! let stream = MetricsStream::spawn(events, store.clone());
//!
//! let (bus, requests) = NotificationBus::channel();
//! let toasts = ToastQueue::spawn(requests, ToastTimings::default());
//!
//! transport.open().await;
//! transport.metric("request.count", 42).await;
//! # });
//! ```

pub mod app;
pub mod bus;
pub mod decode;
pub mod settings;
pub mod store;
pub mod stream;
pub mod toast;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use bus::{NotificationBus, Severity, ToastRequest};
pub use decode::{decode, DecodeError, MetricUpdate};
pub use settings::Settings;
pub use store::{MetricValue, MetricsSnapshot, MetricsStore};
pub use stream::{
    ChannelTransport, EventFrame, MetricsStream, SseTransport, StreamEvent, StreamHealth,
    StreamState, TransportError,
};
pub use toast::{Toast, ToastId, ToastQueue, ToastTimings, Visibility};
