//! Notification sinks

use lilt_core::{NotificationKind, Notifier};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A user-facing message emitted by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Notifier that writes messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => tracing::info!(kind = "success", "{}", message),
            NotificationKind::Info => tracing::info!(kind = "info", "{}", message),
        }
    }
}

/// Notifier that forwards messages over a channel
///
/// Rendering layers hold the receiver and display toasts from it. Messages
/// sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create notifier and the receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        let notification = Notification {
            message: message.to_string(),
            kind,
        };
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification dropped, no receiver: {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_forwards_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify("one", NotificationKind::Success);
        notifier.notify("two", NotificationKind::Info);

        assert_eq!(rx.try_recv().unwrap().message, "one");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.message, "two");
        assert_eq!(second.kind, NotificationKind::Info);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_notifier_survives_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify("ignored", NotificationKind::Info);
    }

    #[test]
    fn notification_serializes_kind_lowercase() {
        let json = serde_json::to_string(&Notification {
            message: "hi".into(),
            kind: NotificationKind::Success,
        })
        .unwrap();
        assert_eq!(json, r#"{"message":"hi","kind":"success"}"#);
    }
}
