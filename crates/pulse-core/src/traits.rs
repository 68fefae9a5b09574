//! Core traits for pulse abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ClaimDisplay, EngagementEvent, EngagementStats, NewEngagementEvent, RecentSearch,
};

/// Durable append-only store for engagement events.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Insert a validated event. The id and `created_at` are assigned at
    /// write time.
    async fn insert(&self, event: &NewEngagementEvent) -> Result<EngagementEvent>;

    /// True if a page visit with this (path, fingerprint) pair exists inside
    /// the half-open interval `[start, end)`.
    async fn visit_exists_between(
        &self,
        path: &str,
        fingerprint: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool>;

    /// Per-action counts for the dashboard windows, relative to `as_of`.
    async fn stats(&self, as_of: DateTime<Utc>) -> Result<EngagementStats>;

    /// Most recently recorded search terms, newest first.
    async fn recent_searches(&self, limit: i64) -> Result<Vec<RecentSearch>>;
}

/// Read-only lookup of claim display data in the content tables.
#[async_trait]
pub trait ClaimDirectory: Send + Sync {
    /// Display data for a casino/bonus pair.
    ///
    /// `None` when either side does not exist, including the case where an
    /// admin deleted the content between the claim write and the lookup.
    async fn claim_display(
        &self,
        casino_id: Uuid,
        bonus_id: Uuid,
    ) -> Result<Option<ClaimDisplay>>;
}
