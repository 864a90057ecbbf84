use crate::application::ports::ListingView;
use crate::application::services::MirrorStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Re-renders the listing whenever another context changes the mirror.
///
/// Only reloads and renders. Refreshing from the remote here would persist,
/// notify the other context, and bounce back.
pub fn spawn_mirror_follower(mirror: MirrorStore, view: Arc<dyn ListingView>) -> JoinHandle<()> {
    let mut subscription = mirror.subscribe();
    tokio::spawn(async move {
        while let Some(event) = subscription.next_foreign().await {
            tracing::debug!(origin = %event.origin, "mirror changed elsewhere, re-rendering");
            let snapshot = mirror.load().await;
            view.render(&snapshot);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MirroredEntry;
    use crate::test_support::{entry, memory_mirror, RecordingView};
    use sl_core::TrackingStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn foreign_write_triggers_render_own_write_does_not() {
        let mirror = memory_mirror();
        let other = mirror.attach();
        let view = RecordingView::new();
        let follower = spawn_mirror_follower(mirror.clone(), view.clone());

        mirror
            .set(MirroredEntry::synced(entry("AB100", TrackingStatus::Pending)))
            .await
            .unwrap();
        other
            .set(MirroredEntry::synced(entry("AB200", TrackingStatus::Pending)))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while view.render_count() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(view.render_count(), 1);
        assert_eq!(view.last_numbers(), vec!["AB100", "AB200"]);
        follower.abort();
    }
}
