//! Timed lifecycle management for transient notifications.
//!
//! The queue owns an ordered sequence of live toasts and drives each one
//! through a fixed two-phase lifecycle on its own timers:
//!
//! ```text
//! publish -> Showing --[show delay]--> FadingOut --[fade delay]--> removed
//! ```
//!
//! Records progress fully independently: inserting, fading, or removing one
//! toast never touches another's timer, and the sequence keeps insertion
//! order across all transitions. Every timer is a task tracked by the
//! driver's `JoinSet`, so dropping the queue cancels all pending
//! transitions before they can act on torn-down state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::debug;

use crate::bus::{Severity, ToastRequest};

/// Identity of a toast within its queue.
///
/// Assigned from a per-queue counter at insertion and never reused, so two
/// requests with identical text are still distinct toasts with independent
/// lifecycles.
pub type ToastId = u64;

/// Visibility phase of a live toast.
///
/// A toast past its fade window is removed from the sequence outright
/// rather than retained in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Fully visible.
    Showing,
    /// Fade-out cue for the renderer (e.g. reduced opacity / dimmed).
    FadingOut,
}

/// Durations of the two lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimings {
    /// Time a toast stays fully visible.
    pub showing: Duration,
    /// Time a toast spends fading before removal.
    pub fading: Duration,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            showing: Duration::from_millis(2500),
            fading: Duration::from_millis(500),
        }
    }
}

/// One live notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub visibility: Visibility,
}

#[derive(Debug, Default)]
struct QueueState {
    toasts: Vec<Toast>,
    next_id: ToastId,
}

impl QueueState {
    fn push(&mut self, request: ToastRequest) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            title: request.title,
            message: request.message,
            severity: request.severity,
            visibility: Visibility::Showing,
        });
        id
    }

    fn fade(&mut self, id: ToastId) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            toast.visibility = Visibility::FadingOut;
        }
    }

    fn remove(&mut self, id: ToastId) {
        self.toasts.retain(|t| t.id != id);
    }
}

/// Owns the ordered set of live toasts.
///
/// Spawned over the receiving end of a [`NotificationBus`] channel; the
/// display layer pulls [`toasts`] on every render. Dropping the queue
/// aborts the driver task and with it every pending lifecycle timer.
///
/// [`NotificationBus`]: crate::bus::NotificationBus
/// [`toasts`]: ToastQueue::toasts
#[derive(Debug)]
pub struct ToastQueue {
    state: Arc<Mutex<QueueState>>,
    driver: JoinHandle<()>,
}

impl ToastQueue {
    /// Spawn a queue consuming requests from `requests`.
    pub fn spawn(requests: mpsc::UnboundedReceiver<ToastRequest>, timings: ToastTimings) -> Self {
        let state = Arc::new(Mutex::new(QueueState::default()));
        let driver = tokio::spawn(run(requests, state.clone(), timings));
        Self { state, driver }
    }

    /// The live toasts in display order.
    pub fn toasts(&self) -> Vec<Toast> {
        self.state.lock().toasts.clone()
    }

    /// Number of live toasts.
    pub fn len(&self) -> usize {
        self.state.lock().toasts.len()
    }

    /// True when no toast is live.
    pub fn is_empty(&self) -> bool {
        self.state.lock().toasts.is_empty()
    }
}

impl Drop for ToastQueue {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn run(
    mut requests: mpsc::UnboundedReceiver<ToastRequest>,
    state: Arc<Mutex<QueueState>>,
    timings: ToastTimings,
) {
    let mut lifecycles = JoinSet::new();
    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                debug!(title = %request.title, "toast enqueued");
                let id = state.lock().push(request);
                lifecycles.spawn(lifecycle(state.clone(), id, timings));
            }
            // Reap finished lifecycles so the set does not grow unbounded.
            Some(_) = lifecycles.join_next(), if !lifecycles.is_empty() => {}
        }
    }
    // Producers are gone; let the remaining toasts run out their timers.
    while lifecycles.join_next().await.is_some() {}
}

async fn lifecycle(state: Arc<Mutex<QueueState>>, id: ToastId, timings: ToastTimings) {
    tokio::time::sleep(timings.showing).await;
    state.lock().fade(id);
    tokio::time::sleep(timings.fading).await;
    state.lock().remove(id);
}
