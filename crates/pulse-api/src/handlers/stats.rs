//! Dashboard read endpoints.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use pulse_core::{defaults, EngagementStats, EngagementStore, RecentSearch};

use crate::{ApiError, AppState};

/// Per-action engagement counts.
///
/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<EngagementStats>, ApiError> {
    let stats = state.db.events.stats(Utc::now()).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct RecentSearchesQuery {
    /// Maximum number of terms to return (default 20, capped at 100).
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecentSearchesResponse {
    pub searches: Vec<RecentSearch>,
}

/// Latest search terms, newest first.
///
/// GET /api/v1/searches/recent
pub async fn recent_searches(
    State(state): State<AppState>,
    Query(query): Query<RecentSearchesQuery>,
) -> Result<Json<RecentSearchesResponse>, ApiError> {
    let searches = state
        .db
        .events
        .recent_searches(effective_limit(query.limit))
        .await?;
    Ok(Json(RecentSearchesResponse { searches }))
}

fn effective_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(defaults::RECENT_SEARCH_LIMIT)
        .clamp(1, defaults::RECENT_SEARCH_LIMIT_MAX)
}
