//! Application state for the dashboard.
//!
//! The app is glue: it owns the core components, pulls their snapshots for
//! rendering, and maps operator input onto collaborator actions. It holds
//! no aggregation or lifecycle logic of its own.

use std::time::Duration;

use crate::bus::{NotificationBus, Severity, ToastRequest};
use crate::store::{MetricsSnapshot, MetricsStore};
use crate::stream::{MetricsStream, StreamHealth};
use crate::toast::{Toast, ToastQueue};
use crate::ui::Theme;

/// Main application state.
///
/// Owns the store, the stream, and the toast queue; dropping the app tears
/// all of them down, cancelling the forwarding task and every pending
/// toast timer.
pub struct App {
    pub running: bool,
    pub theme: Theme,

    store: MetricsStore,
    stream: MetricsStream,
    bus: NotificationBus,
    toasts: ToastQueue,

    stale_window: Duration,
    source_description: String,
}

impl App {
    pub fn new(
        store: MetricsStore,
        stream: MetricsStream,
        bus: NotificationBus,
        toasts: ToastQueue,
        stale_window: Duration,
        source_description: String,
    ) -> Self {
        Self {
            running: true,
            theme: Theme::auto_detect(),
            store,
            stream,
            bus,
            toasts,
            stale_window,
            source_description,
        }
    }

    /// Stop the main loop.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Where the metrics come from, for the status bar.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Current metric snapshot for rendering.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.store.snapshot()
    }

    /// Live toasts in display order.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.toasts()
    }

    /// Current stream connectivity.
    pub fn health(&self) -> StreamHealth {
        self.stream.health()
    }

    /// True when the stream is open but quiet for too long.
    pub fn connection_stale(&self) -> bool {
        self.stream.health().is_stale(self.stale_window)
    }

    /// A handle other components can publish notifications through.
    pub fn bus(&self) -> NotificationBus {
        self.bus.clone()
    }

    /// The reset collaborator action.
    ///
    /// Clears the local snapshot immediately; every key reverts to
    /// "never observed" until the stream delivers fresh values. The
    /// outcome is reported through the notification bus.
    pub fn reset(&mut self) {
        self.store.reset();
        self.bus.publish(
            ToastRequest::new("Reset", "metrics cleared").with_severity(Severity::Success),
        );
    }
}
