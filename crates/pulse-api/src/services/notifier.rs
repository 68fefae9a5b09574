//! Claim notification fan-out.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pulse_core::{ClaimDirectory, ClaimNotification, EngagementEvent, FeedFrame, LiveFeed};

/// Spawn a detached task that decorates a recorded claim with catalog
/// display fields and broadcasts it on the live feed.
///
/// Fire-and-forget: the ingest response never waits on this, and a failed
/// lookup only drops the notification. The recorded event is already
/// durable either way.
pub fn spawn_claim_notification(
    feed: Arc<LiveFeed>,
    directory: Arc<dyn ClaimDirectory>,
    event: EngagementEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        notify(&feed, directory.as_ref(), &event).await;
    })
}

async fn notify(feed: &LiveFeed, directory: &dyn ClaimDirectory, event: &EngagementEvent) {
    let (Some(casino_id), Some(bonus_id)) = (event.casino_id, event.bonus_id) else {
        debug!(
            subsystem = "notifier",
            event_id = %event.id,
            "Claim event carries no catalog refs, nothing to announce"
        );
        return;
    };

    let display = match directory.claim_display(casino_id, bonus_id).await {
        Ok(Some(display)) => display,
        Ok(None) => {
            debug!(
                subsystem = "notifier",
                event_id = %event.id,
                %casino_id,
                %bonus_id,
                "Catalog pair no longer exists, dropping notification"
            );
            return;
        }
        Err(err) => {
            warn!(
                subsystem = "notifier",
                event_id = %event.id,
                error = %err,
                "Claim display lookup failed, dropping notification"
            );
            return;
        }
    };

    let notification = ClaimNotification::new(event, display);
    let delivered = feed.broadcast(FeedFrame::Claim(notification));
    debug!(
        subsystem = "notifier",
        event_id = %event.id,
        delivered,
        "Claim notification broadcast"
    );
}
