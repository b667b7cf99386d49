// src/application/usecase/notification_usecase.rs
// Transient user-facing messages

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, sleep_until, Instant};

use crate::domain::model::{Notification, NotificationKind, NotificationTimings, RenderCommand};
use crate::domain::repository::DashboardView;

/// Appends notifications to the view and retires each one on its own timer.
/// Identical messages are never merged.
pub struct NotificationQueue {
    view: Arc<dyn DashboardView>,
    timings: NotificationTimings,
    next_id: AtomicU64,
}

impl NotificationQueue {
    pub fn new(view: Arc<dyn DashboardView>, timings: NotificationTimings) -> Self {
        Self {
            view,
            timings,
            next_id: AtomicU64::new(1),
        }
    }

    /// Show `message` and schedule its exit transition and removal.
    /// Must be called from within a tokio runtime.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
            created_at: Instant::now(),
            ttl: self.timings.ttl(),
        };

        log::debug!("Notification #{} ({}): {}", notification.id, kind, notification.message);
        self.view.apply(vec![RenderCommand::AppendNotification {
            id: notification.id,
            message: notification.message.clone(),
            kind,
        }]);

        let view = self.view.clone();
        let timings = self.timings;
        let id = notification.id;
        let created_at = notification.created_at;

        tokio::spawn(async move {
            sleep(timings.enter_delay).await;
            view.apply(vec![RenderCommand::ShowNotification { id }]);

            sleep_until(created_at + timings.display).await;
            view.apply(vec![RenderCommand::HideNotification { id }]);

            sleep(timings.removal).await;
            view.apply(vec![RenderCommand::RemoveNotification { id }]);
        });

        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.push(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.push(message, NotificationKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_notification_enters_then_leaves() {
        let document = test_support::document();
        let queue = NotificationQueue::new(document.clone(), NotificationTimings::default());

        let notification = queue.success("Trading started successfully");
        assert_eq!(notification.ttl, Duration::from_millis(3300));

        let shown = document.notifications();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, "Trading started successfully");
        assert!(!shown[0].is_shown());

        sleep(Duration::from_millis(20)).await;
        assert!(document.notifications()[0].is_shown());

        sleep(Duration::from_millis(2990)).await;
        assert!(!document.notifications()[0].is_shown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_removed_after_display_and_removal_delay() {
        let document = test_support::document();
        let queue = NotificationQueue::new(document.clone(), NotificationTimings::default());

        let notification = queue.error("Failed to start trading");

        // Still attached just before ttl
        sleep_until(notification.created_at + notification.ttl - Duration::from_millis(1)).await;
        assert_eq!(document.notifications().len(), 1);

        // Gone within a small margin after
        sleep_until(notification.created_at + notification.ttl + Duration::from_millis(5)).await;
        assert!(document.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_messages_stack_independently() {
        let document = test_support::document();
        let queue = NotificationQueue::new(document.clone(), NotificationTimings::default());

        let first = queue.error("Failed to stop trading");
        sleep(Duration::from_millis(1000)).await;
        let second = queue.error("Failed to stop trading");

        assert_ne!(first.id, second.id);
        assert_eq!(document.notifications().len(), 2);

        sleep_until(first.created_at + first.ttl + Duration::from_millis(1)).await;
        let remaining = document.notifications();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);

        sleep_until(second.created_at + second.ttl + Duration::from_millis(1)).await;
        assert!(document.notifications().is_empty());
    }
}
