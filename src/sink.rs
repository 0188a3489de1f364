use matrix_sdk::ruma::RoomId;
use tokio::sync::mpsc::UnboundedSender;

/// A rendered message, ready to be posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub body: String,
    pub author: String,
}

#[derive(Debug)]
pub struct Delivery {
    pub notification: Notification,
    pub destination: RoomId,
}

/// Where rendered notifications end up.
///
/// Implementations are shared by every request handler, and must not block the caller for long.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: Notification, destination: &RoomId) -> anyhow::Result<()>;
}

/// Hands notifications over to the Matrix bot through a channel. Delivery itself happens on the
/// bot's side, so this never waits on the homeserver.
pub struct ChannelSink(pub UnboundedSender<Delivery>);

impl NotificationSink for ChannelSink {
    fn deliver(&self, notification: Notification, destination: &RoomId) -> anyhow::Result<()> {
        self.0
            .send(Delivery {
                notification,
                destination: destination.clone(),
            })
            .map_err(|_| anyhow::anyhow!("delivery channel was closed / dropped"))
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    fn notification() -> Notification {
        Notification {
            body: "hello".to_string(),
            author: "hookrelay".to_string(),
        }
    }

    #[test]
    fn enqueues_delivery() {
        let (sender, mut receiver) = unbounded_channel();
        let sink = ChannelSink(sender);
        let room = RoomId::try_from("!room:example.org").unwrap();

        sink.deliver(notification(), &room).unwrap();

        let delivery = receiver.try_recv().unwrap();
        assert_eq!(delivery.notification, notification());
        assert_eq!(delivery.destination, room);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn closed_channel() {
        let (sender, receiver) = unbounded_channel();
        drop(receiver);
        let sink = ChannelSink(sender);
        let room = RoomId::try_from("!room:example.org").unwrap();

        assert!(sink.deliver(notification(), &room).is_err());
    }
}
