//! Core data models for pulse.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionKind;
use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// ENGAGEMENT EVENTS
// =============================================================================

/// A stored engagement event row.
///
/// The optional columns are populated per action kind: claims carry the
/// casino/bonus pair, visits carry `path` plus the visitor fingerprint in
/// `correlation_key`, searches carry the term in `correlation_key`, and
/// `test` events carry nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementEvent {
    /// UUIDv7, assigned at write time (time-ordered).
    pub id: Uuid,
    /// What the visitor did.
    pub action: ActionKind,
    /// Casino the claim refers to. NULL after the casino is deleted.
    pub casino_id: Option<Uuid>,
    /// Bonus the claim refers to. NULL after the bonus is deleted.
    pub bonus_id: Option<Uuid>,
    /// Originating page URL for visits.
    pub path: Option<String>,
    /// Visitor fingerprint (visits) or search term (searches).
    pub correlation_key: Option<String>,
    /// Server-side insertion timestamp. Dedup and stats boundary.
    pub created_at: DateTime<Utc>,
}

/// Per-kind payload of an event about to be recorded.
///
/// Replaces a single overloaded free-text field with one variant per action
/// shape, so a visit fingerprint can never be confused with a search term.
/// The flat nullable columns exist only at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    /// Bonus claim (`code_copy` or `offer_click`).
    Claim { casino_id: Uuid, bonus_id: Uuid },
    /// Page visit, deduplicated per day on (path, fingerprint).
    Visit { path: String, fingerprint: String },
    /// On-site search.
    Search { term: String },
    /// Ingest-path smoke event.
    Test,
}

impl EventDetail {
    /// Casino column value for storage.
    pub fn casino_id(&self) -> Option<Uuid> {
        match self {
            EventDetail::Claim { casino_id, .. } => Some(*casino_id),
            _ => None,
        }
    }

    /// Bonus column value for storage.
    pub fn bonus_id(&self) -> Option<Uuid> {
        match self {
            EventDetail::Claim { bonus_id, .. } => Some(*bonus_id),
            _ => None,
        }
    }

    /// Path column value for storage.
    pub fn path(&self) -> Option<&str> {
        match self {
            EventDetail::Visit { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Correlation key column value for storage.
    pub fn correlation_key(&self) -> Option<&str> {
        match self {
            EventDetail::Visit { fingerprint, .. } => Some(fingerprint),
            EventDetail::Search { term } => Some(term),
            _ => None,
        }
    }
}

/// A validated event ready for insertion.
///
/// Invariant: `detail` always matches `action` (claims carry `Claim`,
/// visits carry `Visit`, and so on). Construct through
/// [`TrackEventRequest::validate`] or the per-kind constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEngagementEvent {
    pub action: ActionKind,
    pub detail: EventDetail,
}

impl NewEngagementEvent {
    /// A bonus claim. `action` must be one of the claim kinds.
    pub fn claim(action: ActionKind, casino_id: Uuid, bonus_id: Uuid) -> Self {
        Self {
            action,
            detail: EventDetail::Claim {
                casino_id,
                bonus_id,
            },
        }
    }

    /// A page visit.
    pub fn visit(path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            action: ActionKind::PageVisit,
            detail: EventDetail::Visit {
                path: path.into(),
                fingerprint: fingerprint.into(),
            },
        }
    }

    /// An on-site search.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            action: ActionKind::Search,
            detail: EventDetail::Search { term: term.into() },
        }
    }

    /// A smoke event.
    pub fn test() -> Self {
        Self {
            action: ActionKind::Test,
            detail: EventDetail::Test,
        }
    }
}

/// Outcome of recording an engagement event.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Event persisted; payload is the stored row.
    Recorded(EngagementEvent),
    /// A matching visit already existed inside the current day window.
    /// Nothing was written.
    SkippedDuplicate,
}

// =============================================================================
// INGEST REQUEST
// =============================================================================

/// Wire payload of the ingest endpoint.
///
/// Every field is optional at the serde level so that per-kind requirements
/// produce uniform validation errors instead of body-rejection responses.
/// Subject ids arrive as strings and are parsed during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackEventRequest {
    pub action_type: Option<String>,
    pub subject_id: Option<String>,
    pub related_subject_id: Option<String>,
    pub path: Option<String>,
    pub correlation_key: Option<String>,
}

impl TrackEventRequest {
    /// Validate the request into an insertable event.
    ///
    /// Pure. Checks the action vocabulary and the per-kind required fields;
    /// nothing here touches the store.
    pub fn validate(&self) -> Result<NewEngagementEvent> {
        let action_raw = self
            .action_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("actionType is required".to_string()))?;
        let action: ActionKind = action_raw.parse().map_err(Error::InvalidInput)?;

        let detail = match action {
            ActionKind::CodeCopy | ActionKind::OfferClick => {
                let casino_id = parse_subject_uuid(self.subject_id.as_deref(), "subjectId")?;
                let bonus_id =
                    parse_subject_uuid(self.related_subject_id.as_deref(), "relatedSubjectId")?;
                EventDetail::Claim {
                    casino_id,
                    bonus_id,
                }
            }
            ActionKind::PageVisit => {
                let path = require_text(
                    self.path.as_deref(),
                    "path",
                    defaults::PATH_MAX_LENGTH,
                )?;
                let fingerprint = require_text(
                    self.correlation_key.as_deref(),
                    "correlationKey",
                    defaults::CORRELATION_KEY_MAX_LENGTH,
                )?;
                EventDetail::Visit { path, fingerprint }
            }
            ActionKind::Search => {
                let term = require_text(
                    self.correlation_key.as_deref(),
                    "correlationKey",
                    defaults::CORRELATION_KEY_MAX_LENGTH,
                )?;
                EventDetail::Search { term }
            }
            ActionKind::Test => EventDetail::Test,
        };

        Ok(NewEngagementEvent { action, detail })
    }
}

fn require_text(value: Option<&str>, field: &str, max_length: usize) -> Result<String> {
    let text = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("{} is required for this action", field)))?;
    if text.chars().count() > max_length {
        return Err(Error::InvalidInput(format!(
            "{} exceeds maximum length of {} characters",
            field, max_length
        )));
    }
    Ok(text.to_string())
}

fn parse_subject_uuid(value: Option<&str>, field: &str) -> Result<Uuid> {
    let raw = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("{} is required for this action", field)))?;
    Uuid::parse_str(raw).map_err(|_| Error::InvalidInput(format!("{} must be a UUID", field)))
}

// =============================================================================
// CLAIM DISPLAY
// =============================================================================

/// Display data for announcing a claim, joined from the content tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimDisplay {
    pub casino_name: String,
    pub casino_slug: String,
    pub casino_logo: Option<String>,
    pub bonus_title: String,
    pub bonus_code: Option<String>,
}

/// Payload of a `claim` feed frame, as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimNotification {
    /// Id of the recorded engagement event.
    pub id: Uuid,
    pub action: ActionKind,
    pub casino_name: String,
    pub casino_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casino_logo: Option<String>,
    pub bonus_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_code: Option<String>,
    /// When the event was recorded.
    pub at: DateTime<Utc>,
}

impl ClaimNotification {
    /// Build the wire notification for a recorded claim.
    pub fn new(event: &EngagementEvent, display: ClaimDisplay) -> Self {
        Self {
            id: event.id,
            action: event.action,
            casino_name: display.casino_name,
            casino_slug: display.casino_slug,
            casino_logo: display.casino_logo,
            bonus_title: display.bonus_title,
            bonus_code: display.bonus_code,
            at: event.created_at,
        }
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Counts for one action kind across the dashboard windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    /// Events since midnight UTC.
    pub today: i64,
    /// Events in the rolling last 7 days.
    pub week: i64,
    /// Events ever recorded.
    pub total: i64,
}

/// Per-action engagement counts for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementStats {
    /// Counts keyed by action wire name. Always contains every kind.
    pub actions: BTreeMap<ActionKind, ActionCounts>,
    pub generated_at: DateTime<Utc>,
}

impl EngagementStats {
    /// Stats with a zeroed entry for every action kind.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        let mut actions = BTreeMap::new();
        for kind in ActionKind::ALL {
            actions.insert(kind, ActionCounts::default());
        }
        Self {
            actions,
            generated_at,
        }
    }

    /// Mutable counts entry for a kind, created zeroed if absent.
    pub fn counts_mut(&mut self, kind: ActionKind) -> &mut ActionCounts {
        self.actions.entry(kind).or_default()
    }
}

/// One recently recorded search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub term: String,
    pub at: DateTime<Utc>,
}
