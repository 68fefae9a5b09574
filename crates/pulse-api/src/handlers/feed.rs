//! Live feed SSE endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{sse::Event, Sse};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use pulse_core::{FeedFrame, LiveFeed, SubscriberId};

use crate::AppState;

/// Registration handle that reverses itself when the client goes away.
///
/// Axum drops the response body on disconnect, which drops the stream,
/// which drops this. No explicit teardown path exists and none is needed.
struct FeedConnection {
    feed: Arc<LiveFeed>,
    subscriber_id: SubscriberId,
    heartbeat: tokio::task::JoinHandle<()>,
}

impl Drop for FeedConnection {
    fn drop(&mut self) {
        self.heartbeat.abort();
        self.feed.unregister(self.subscriber_id);
        debug!(
            subsystem = "feed",
            subscriber_id = %self.subscriber_id,
            "Feed stream dropped, subscriber unregistered"
        );
    }
}

/// Subscribe to the live engagement feed.
///
/// GET /api/v1/feed
///
/// Server-Sent Events stream. The first frame is always `connected`, then
/// `heartbeat` frames follow on a fixed interval so intermediaries keep the
/// connection open, with `claim` frames interleaved as they happen.
pub async fn subscribe_feed(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let (subscriber_id, rx) = state.feed.register();
    state
        .feed
        .push(subscriber_id, FeedFrame::connected(subscriber_id));

    let heartbeat = tokio::spawn({
        let feed = state.feed.clone();
        let period = state.heartbeat_interval;
        async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // the first tick completes immediately
            loop {
                ticker.tick().await;
                // A failed push means the subscriber is gone.
                if !feed.push(subscriber_id, FeedFrame::heartbeat()) {
                    break;
                }
            }
        }
    });

    let connection = FeedConnection {
        feed: state.feed.clone(),
        subscriber_id,
        heartbeat,
    };

    use tokio_stream::StreamExt as _;
    let stream = ReceiverStream::new(rx).filter_map(move |frame| {
        match serde_json::to_string(&frame) {
            Ok(json) => Some(Ok(Event::default().event(frame.event_name()).data(json))),
            Err(e) => {
                debug!(
                    subsystem = "feed",
                    subscriber_id = %connection.subscriber_id,
                    error = %e,
                    "Skipping unserializable feed frame"
                );
                None
            }
        }
    });

    Sse::new(stream)
}
