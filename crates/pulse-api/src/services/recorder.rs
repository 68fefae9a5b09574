//! Engagement event recording service.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use pulse_core::{
    utc_day_bounds, ActionKind, EngagementStore, EventDetail, RecordOutcome, Result,
    TrackEventRequest,
};

/// Validates and persists engagement events.
///
/// Sits between the HTTP surface and the store: handlers hand over the raw
/// request body, the recorder applies the action vocabulary and per-kind
/// field rules, runs the same-day visit check, and appends to the store.
pub struct EventRecorder {
    store: Arc<dyn EngagementStore>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Record one engagement event.
    ///
    /// Page visits are checked against the current UTC day first: a repeat
    /// (path, correlationKey) pair is skipped without writing. Every other
    /// kind appends unconditionally.
    pub async fn record(&self, request: &TrackEventRequest) -> Result<RecordOutcome> {
        let event = request.validate()?;

        if let EventDetail::Visit { path, fingerprint } = &event.detail {
            let (start, end) = utc_day_bounds(Utc::now());
            if self
                .store
                .visit_exists_between(path, fingerprint, start, end)
                .await?
            {
                debug!(
                    subsystem = "recorder",
                    path = %path,
                    "Repeat visit for today, skipping"
                );
                return Ok(RecordOutcome::SkippedDuplicate);
            }
        }

        match self.store.insert(&event).await {
            Ok(recorded) => Ok(RecordOutcome::Recorded(recorded)),
            Err(err) if event.action == ActionKind::PageVisit && err.is_unique_violation() => {
                // A concurrent insert won the same-day race under the strict
                // visit index. Same answer as the pre-check.
                debug!(subsystem = "recorder", "Concurrent visit detected, skipping");
                Ok(RecordOutcome::SkippedDuplicate)
            }
            Err(err) => Err(err),
        }
    }
}
