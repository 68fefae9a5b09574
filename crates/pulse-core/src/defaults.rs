//! Centralized default constants for the pulse system.
//!
//! **This module is the single source of truth** for all shared default
//! values. The crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// LIVE FEED
// =============================================================================

/// Per-subscriber send buffer capacity in frames.
///
/// Broadcasts never block: a subscriber whose buffer is full is treated as
/// unreachable and removed from the registry. At one claim per second plus
/// heartbeats, 256 frames gives a stalled consumer several minutes of slack
/// before disconnection.
pub const FEED_CHANNEL_CAPACITY: usize = 256;

/// Default heartbeat interval for live feed connections, in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum accepted `path` length in characters.
pub const PATH_MAX_LENGTH: usize = 2048;

/// Maximum accepted `correlationKey` length in characters.
pub const CORRELATION_KEY_MAX_LENGTH: usize = 512;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (64 KB; tracking payloads are tiny).
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

// =============================================================================
// STATS
// =============================================================================

/// Default page size for the recent searches endpoint.
pub const RECENT_SEARCH_LIMIT: i64 = 20;

/// Maximum page size for the recent searches endpoint.
pub const RECENT_SEARCH_LIMIT_MAX: i64 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_search_limits_ordered() {
        const {
            assert!(RECENT_SEARCH_LIMIT < RECENT_SEARCH_LIMIT_MAX);
        }
    }

    #[test]
    fn validation_caps_fit_in_body_limit() {
        // A maximal request must still fit the body limit with headroom
        const {
            assert!(PATH_MAX_LENGTH + CORRELATION_KEY_MAX_LENGTH < MAX_BODY_SIZE_BYTES);
        }
    }
}
