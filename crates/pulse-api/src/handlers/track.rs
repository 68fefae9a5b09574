//! Engagement event ingest endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use pulse_core::{ActionKind, RecordOutcome, TrackEventRequest};

use crate::services::spawn_claim_notification;
use crate::{ApiError, AppState};

/// Response body of the ingest endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventResponse {
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_visitor: Option<bool>,
}

/// Record one engagement event.
///
/// POST /api/v1/events
///
/// Recorded events answer 201; a same-day repeat visit answers 200 with
/// `recorded: false`. Claims additionally kick off a detached feed
/// notification which the response never waits for.
pub async fn track_event(
    State(state): State<AppState>,
    Json(request): Json<TrackEventRequest>,
) -> Result<(StatusCode, Json<TrackEventResponse>), ApiError> {
    let outcome = state.recorder.record(&request).await?;

    if let RecordOutcome::Recorded(event) = &outcome {
        if event.action.is_claim() {
            spawn_claim_notification(state.feed.clone(), state.directory.clone(), event.clone());
        }
    }

    Ok(respond(outcome))
}

fn respond(outcome: RecordOutcome) -> (StatusCode, Json<TrackEventResponse>) {
    match outcome {
        RecordOutcome::Recorded(event) => {
            let is_new_visitor = (event.action == ActionKind::PageVisit).then_some(true);
            (
                StatusCode::CREATED,
                Json(TrackEventResponse {
                    recorded: true,
                    id: Some(event.id),
                    is_new_visitor,
                }),
            )
        }
        RecordOutcome::SkippedDuplicate => (
            StatusCode::OK,
            Json(TrackEventResponse {
                recorded: false,
                id: None,
                is_new_visitor: Some(false),
            }),
        ),
    }
}
