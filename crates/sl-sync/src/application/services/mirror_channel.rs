use crate::domain::{ContextId, MirrorChanged};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const DEFAULT_CAPACITY: usize = 64;

/// In-process publish/subscribe for mirror writes. Changes made by other
/// processes reach it through the revision watcher.
#[derive(Clone)]
pub struct MirrorChannel {
    sender: broadcast::Sender<MirrorChanged>,
}

impl MirrorChannel {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: MirrorChanged) {
        // no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, context: ContextId, storage_key: &str) -> MirrorSubscription {
        MirrorSubscription {
            receiver: self.sender.subscribe(),
            context,
            storage_key: storage_key.to_string(),
        }
    }
}

impl Default for MirrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives change notices for one storage key, skipping those the owning
/// context published itself.
pub struct MirrorSubscription {
    receiver: broadcast::Receiver<MirrorChanged>,
    context: ContextId,
    storage_key: String,
}

impl MirrorSubscription {
    /// Waits for the next foreign change. `None` once the channel is gone.
    pub async fn next_foreign(&mut self) -> Option<MirrorChanged> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if event.origin != self.context && event.storage_key == self.storage_key {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "mirror subscription lagged");
                    return Some(MirrorChanged {
                        storage_key: self.storage_key.clone(),
                        origin: ContextId::external(),
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(key: &str, origin: ContextId) -> MirrorChanged {
        MirrorChanged {
            storage_key: key.to_string(),
            origin,
        }
    }

    #[tokio::test]
    async fn subscription_skips_own_and_unrelated_events() {
        let channel = MirrorChannel::new();
        let mine = ContextId::new();
        let other = ContextId::new();
        let mut subscription = channel.subscribe(mine, "trackingCache_v2");

        channel.publish(changed("trackingCache_v2", mine));
        channel.publish(changed("somethingElse", other));
        channel.publish(changed("trackingCache_v2", other));

        let event = subscription.next_foreign().await.unwrap();
        assert_eq!(event.origin, other);
    }

    #[tokio::test]
    async fn subscription_ends_when_channel_dropped() {
        let channel = MirrorChannel::new();
        let mut subscription = channel.subscribe(ContextId::new(), "k");
        drop(channel);
        assert!(subscription.next_foreign().await.is_none());
    }
}
