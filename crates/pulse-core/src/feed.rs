//! Live feed registry and broadcaster for real-time claim notifications.
//!
//! Subscribers register a bounded frame sink and receive every frame
//! broadcast while they are connected. Delivery is fire-and-forget: a push
//! never blocks the producer, and a sink that is gone or has a full buffer
//! is removed from the registry during the pass. There is no replay and no
//! cross-process fan-out; the registry is process-local state shared behind
//! one mutex.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::ClaimNotification;

/// Identifier of a registered feed subscriber.
pub type SubscriberId = Uuid;

// ============================================================================
// Feed Frames
// ============================================================================

/// A frame delivered to feed subscribers.
///
/// Frames are serialized as JSON with a `type` tag field and camelCase
/// payload fields, e.g. `{"type":"heartbeat","at":"..."}`. On the stream
/// transport the tag doubles as the event name, via [`FeedFrame::event_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FeedFrame {
    /// Hello frame, sent once immediately after registration.
    Connected {
        subscriber_id: SubscriberId,
        at: DateTime<Utc>,
    },
    /// Periodic liveness frame.
    Heartbeat { at: DateTime<Utc> },
    /// A bonus claim was recorded.
    Claim(ClaimNotification),
}

impl FeedFrame {
    /// Hello frame for a freshly registered subscriber.
    pub fn connected(subscriber_id: SubscriberId) -> Self {
        FeedFrame::Connected {
            subscriber_id,
            at: Utc::now(),
        }
    }

    /// Liveness frame stamped with the current time.
    pub fn heartbeat() -> Self {
        FeedFrame::Heartbeat { at: Utc::now() }
    }

    /// Stream event name for this frame.
    pub fn event_name(&self) -> &'static str {
        match self {
            FeedFrame::Connected { .. } => "connected",
            FeedFrame::Heartbeat { .. } => "heartbeat",
            FeedFrame::Claim(_) => "claim",
        }
    }
}

impl From<ClaimNotification> for FeedFrame {
    fn from(notification: ClaimNotification) -> Self {
        FeedFrame::Claim(notification)
    }
}

// ============================================================================
// Live Feed
// ============================================================================

/// Registry of connected feed subscribers with broadcast fan-out.
///
/// Each subscriber owns the receiving half of a bounded `mpsc` channel;
/// the registry holds the senders. [`LiveFeed::broadcast`] pushes to every
/// sink with `try_send` and removes the sinks that fail, so the registry
/// heals itself without a reaper task. A full buffer counts as a failure:
/// a consumer that stopped draining its stream is indistinguishable from a
/// dead one and gets disconnected rather than back-pressuring producers.
pub struct LiveFeed {
    sinks: Mutex<HashMap<SubscriberId, mpsc::Sender<FeedFrame>>>,
    capacity: usize,
}

impl LiveFeed {
    /// Create a new feed with the given per-subscriber buffer capacity.
    ///
    /// Recommended: [`crate::defaults::FEED_CHANNEL_CAPACITY`] for
    /// production, something small for tests exercising the overflow path.
    pub fn new(capacity: usize) -> Self {
        Self {
            sinks: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn sinks(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<FeedFrame>>> {
        self.sinks.lock().unwrap()
    }

    /// Register a new subscriber.
    ///
    /// Returns the subscriber id and the receiving half of its sink. The
    /// subscriber stays registered until [`LiveFeed::unregister`] or a
    /// failed push removes it.
    pub fn register(&self) -> (SubscriberId, mpsc::Receiver<FeedFrame>) {
        let id = crate::uuid_utils::new_v7();
        let (tx, rx) = mpsc::channel(self.capacity);
        let subscriber_count = {
            let mut sinks = self.sinks();
            sinks.insert(id, tx);
            sinks.len()
        };
        tracing::debug!(
            subsystem = "feed",
            op = "register",
            subscriber_id = %id,
            subscriber_count,
            "Feed subscriber registered"
        );
        (id, rx)
    }

    /// Remove a subscriber. Unknown ids are ignored, so teardown paths may
    /// unregister unconditionally.
    pub fn unregister(&self, id: SubscriberId) {
        let (removed, subscriber_count) = {
            let mut sinks = self.sinks();
            (sinks.remove(&id).is_some(), sinks.len())
        };
        if removed {
            tracing::debug!(
                subsystem = "feed",
                op = "unregister",
                subscriber_id = %id,
                subscriber_count,
                "Feed subscriber unregistered"
            );
        }
    }

    /// Push a frame to a single subscriber.
    ///
    /// Returns false if the subscriber is unknown or unreachable; an
    /// unreachable sink is removed before returning.
    pub fn push(&self, id: SubscriberId, frame: FeedFrame) -> bool {
        let failure = {
            let mut sinks = self.sinks();
            let Some(tx) = sinks.get(&id) else {
                return false;
            };
            match tx.try_send(frame) {
                Ok(()) => None,
                Err(err) => {
                    sinks.remove(&id);
                    Some(failure_reason(&err))
                }
            }
        };
        match failure {
            None => true,
            Some(reason) => {
                tracing::debug!(
                    subsystem = "feed",
                    op = "push",
                    subscriber_id = %id,
                    reason,
                    "Removed unreachable feed subscriber"
                );
                false
            }
        }
    }

    /// Broadcast a frame to every subscriber. Returns how many sinks
    /// accepted the frame.
    ///
    /// Single pass under the registry lock; sinks that fail the push are
    /// removed in the same pass. Per-subscriber frame order is preserved
    /// because broadcasts are serialized by the lock and each sink is FIFO.
    pub fn broadcast(&self, frame: FeedFrame) -> usize {
        let event = frame.event_name();
        let mut unreachable: Vec<SubscriberId> = Vec::new();
        let (delivered, subscriber_count) = {
            let mut sinks = self.sinks();
            let mut delivered = 0usize;
            for (id, tx) in sinks.iter() {
                match tx.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => unreachable.push(*id),
                }
            }
            for id in &unreachable {
                sinks.remove(id);
            }
            (delivered, sinks.len())
        };
        tracing::debug!(
            subsystem = "feed",
            op = "broadcast",
            event,
            delivered,
            removed = unreachable.len(),
            subscriber_count,
            "Feed broadcast"
        );
        delivered
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sinks().len()
    }

    /// Drop every sink. Subscribers observe end-of-stream on their
    /// receivers. Used at shutdown.
    pub fn close(&self) {
        let drained = {
            let mut sinks = self.sinks();
            let n = sinks.len();
            sinks.clear();
            n
        };
        if drained > 0 {
            tracing::info!(
                subsystem = "feed",
                op = "close",
                subscriber_count = drained,
                "Feed closed, dropped all subscriber sinks"
            );
        }
    }
}

fn failure_reason(err: &mpsc::error::TrySendError<FeedFrame>) -> &'static str {
    match err {
        mpsc::error::TrySendError::Full(_) => "buffer_full",
        mpsc::error::TrySendError::Closed(_) => "closed",
    }
}

// ============================================================================
// Tests
// ============================================================================
