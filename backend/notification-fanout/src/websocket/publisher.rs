/// Best-effort notification fan-out
///
/// Looks up every live connection of a recipient and hands the serialized
/// frame to each open one. Closed connections are skipped, never retried and
/// never removed here; the session's own close path unregisters them.
use super::messages::ServerMessage;
use super::registry::{ConnectionRegistry, SocketHandle};
use crate::error::Result;
use crate::metrics;
use crate::models::{Notification, UserId};
use std::sync::Arc;

/// Entry point for write paths (follow, like, comment, share, ...) once the
/// notification record has been persisted.
pub trait NotifyUser: Send + Sync {
    fn notify_user(&self, recipient: UserId, notification: &Notification) -> Result<()>;
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
struct Delivery {
    sent: usize,
    skipped: usize,
}

pub struct NotificationPublisher<H> {
    registry: Arc<ConnectionRegistry<H>>,
}

impl<H> Clone for NotificationPublisher<H> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<H: SocketHandle> NotificationPublisher<H> {
    pub fn new(registry: Arc<ConnectionRegistry<H>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry<H>> {
        &self.registry
    }

    /// Push `notification` to every live connection of `user_id`.
    ///
    /// Returns once the frame is queued on each open connection. A user with
    /// no connection is a silent no-op. Only a payload that fails to
    /// serialize produces an error.
    pub fn publish(&self, user_id: UserId, notification: &Notification) -> Result<()> {
        let frame = encode(notification)?;
        metrics::observe_publish(notification.kind().as_str());

        let delivery = self.deliver(&self.registry.find_by_identity(user_id), &frame);
        if delivery.sent + delivery.skipped > 0 {
            tracing::debug!(
                %user_id,
                kind = %notification.kind(),
                sent = delivery.sent,
                skipped = delivery.skipped,
                "notification fanned out"
            );
        }

        Ok(())
    }

    /// Push the same notification to several recipients, serializing once
    pub fn publish_many<I>(&self, recipients: I, notification: &Notification) -> Result<()>
    where
        I: IntoIterator<Item = UserId>,
    {
        let frame = encode(notification)?;
        let mut total = Delivery::default();

        for user_id in recipients {
            metrics::observe_publish(notification.kind().as_str());
            let delivery = self.deliver(&self.registry.find_by_identity(user_id), &frame);
            total.sent += delivery.sent;
            total.skipped += delivery.skipped;
        }

        tracing::debug!(
            kind = %notification.kind(),
            sent = total.sent,
            skipped = total.skipped,
            "notification fanned out to recipients"
        );

        Ok(())
    }

    /// Push to every authenticated connection
    pub fn broadcast(&self, notification: &Notification) -> Result<()> {
        let frame = encode(notification)?;
        metrics::observe_publish(notification.kind().as_str());

        let delivery = self.deliver(&self.registry.bound_handles(), &frame);
        tracing::debug!(
            kind = %notification.kind(),
            sent = delivery.sent,
            skipped = delivery.skipped,
            "notification broadcast"
        );

        Ok(())
    }

    fn deliver(&self, handles: &[H], frame: &Arc<str>) -> Delivery {
        let mut delivery = Delivery::default();

        for handle in handles {
            // Closed between lookup and send
            if !handle.is_open() {
                delivery.skipped += 1;
                continue;
            }
            match handle.send_text(Arc::clone(frame)) {
                Ok(()) => delivery.sent += 1,
                Err(_) => delivery.skipped += 1,
            }
        }

        metrics::observe_delivery(delivery.sent, delivery.skipped);
        delivery
    }
}

impl<H: SocketHandle> NotifyUser for NotificationPublisher<H> {
    fn notify_user(&self, recipient: UserId, notification: &Notification) -> Result<()> {
        self.publish(recipient, notification)
    }
}

fn encode(notification: &Notification) -> Result<Arc<str>> {
    let json = ServerMessage::notification(notification).to_json()?;
    Ok(Arc::from(json))
}
