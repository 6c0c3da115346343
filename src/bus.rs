//! Fan-in channel for user-visible notifications.
//!
//! Any component can request a toast without holding a reference to the
//! queue that displays it: producers clone a [`NotificationBus`] handle and
//! publish into it, the [`ToastQueue`](crate::toast::ToastQueue) consumes
//! the single receiving end.
//!
//! Publishing cannot fail. That keeps the bus safely callable from any
//! failure-handling path, including failure reporting itself.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Severity of a notification, controlling presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral informational message.
    #[default]
    Default,
    /// Non-critical issue the operator should notice.
    Warn,
    /// Successful operation.
    Success,
    /// Failed operation.
    Error,
}

/// A request to show a transient notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastRequest {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl ToastRequest {
    /// Build a request with the default severity.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Default,
        }
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Clonable producer half of the notification channel.
///
/// # Example
///
/// ```
/// use loadwatch::{NotificationBus, Severity, ToastRequest};
///
/// let (bus, mut requests) = NotificationBus::channel();
///
/// bus.publish(ToastRequest::new("Login", "ok").with_severity(Severity::Success));
///
/// let request = requests.try_recv().unwrap();
/// assert_eq!(request.title, "Login");
/// ```
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: mpsc::UnboundedSender<ToastRequest>,
}

impl NotificationBus {
    /// Create a bus and the receiving end for its single consumer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ToastRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget publish.
    ///
    /// No acknowledgement, no return value, no failure mode: a publish with
    /// no live consumer is dropped.
    pub fn publish(&self, request: ToastRequest) {
        let _ = self.tx.send(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_in_order_across_clones() {
        let (bus, mut rx) = NotificationBus::channel();
        let other = bus.clone();

        bus.publish(ToastRequest::new("Login", "ok").with_severity(Severity::Success));
        other.publish(ToastRequest::new("Reset", "failed").with_severity(Severity::Error));

        assert_eq!(rx.try_recv().unwrap().title, "Login");
        assert_eq!(rx.try_recv().unwrap().title, "Reset");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_consumer_is_dropped() {
        let (bus, rx) = NotificationBus::channel();
        drop(rx);

        // Must not panic or report anything.
        bus.publish(ToastRequest::new("Logout", "done"));
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Default).unwrap(), "\"default\"");
        assert_eq!(serde_json::to_string(&Severity::Warn).unwrap(), "\"warn\"");
        assert_eq!(serde_json::to_string(&Severity::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn request_severity_defaults_when_omitted() {
        let request: ToastRequest =
            serde_json::from_str(r#"{"title":"Login","message":"ok"}"#).unwrap();
        assert_eq!(request.severity, Severity::Default);
    }
}
