//! Transient user-facing notices.
//!
//! Failures of explicit user actions (a rejected key, a wrong pairing code)
//! are published here as [`Notice`]s.  The presentation layer shows each one
//! and dismisses it after [`Notice::dismiss_after`].  Background failures
//! (status polls, event long-polls) never reach this board.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::warn;

use crate::application::gateway::RemoteError;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One auto-dismissing message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub dismiss_after: Duration,
}

/// Broadcast hub for notices.
pub struct NoticeBoard {
    tx: broadcast::Sender<Notice>,
    lifetime: Duration,
}

impl NoticeBoard {
    /// Creates a board whose notices auto-dismiss after `lifetime`.
    pub fn new(lifetime: Duration) -> Self {
        let (tx, _rx) = broadcast::channel(32);
        Self { tx, lifetime }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NoticeKind::Info, message.into());
    }

    /// Publishes a failed user action.
    pub fn error(&self, err: &RemoteError) {
        warn!(error = %err, "user action failed");
        self.publish(NoticeKind::Error, err.to_string());
    }

    fn publish(&self, kind: NoticeKind, message: String) {
        // No subscribers is fine: nobody is looking.
        let _ = self.tx.send(Notice {
            kind,
            message,
            dismiss_after: self.lifetime,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_notice_carries_message_and_lifetime() {
        // Arrange
        let board = NoticeBoard::new(Duration::from_secs(3));
        let mut rx = board.subscribe();

        // Act
        board.error(&RemoteError::NotConnected);

        // Assert
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "not connected to the TV");
        assert_eq!(notice.dismiss_after, Duration::from_secs(3));
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let board = NoticeBoard::new(Duration::from_secs(1));
        board.info("pairing code accepted");
    }
}
