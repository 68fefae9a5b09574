//! Time-ordered identifiers for engagement events.
//!
//! Every event id is a UUIDv7 (RFC 9562). The leading 48 bits carry the
//! Unix millisecond timestamp of generation, so ids sort by creation time
//! and the primary key index stays append-friendly without a separate
//! sequence.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a fresh UUIDv7.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Whether this UUID carries a v7 version nibble.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}

/// Creation time embedded in a UUIDv7, at millisecond precision.
///
/// Returns `None` for any other UUID version, so callers can feed ids of
/// unknown provenance without checking first.
pub fn extract_timestamp(uuid: &Uuid) -> Option<DateTime<Utc>> {
    if !is_v7(uuid) {
        return None;
    }
    let (secs, nanos) = uuid.get_timestamp()?.to_unix();
    DateTime::from_timestamp(secs as i64, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn generated_ids_are_v7() {
        assert!(is_v7(&new_v7()));
        assert!(!is_v7(&Uuid::new_v4()));
        assert!(!is_v7(&Uuid::nil()));
    }

    #[test]
    fn later_ids_sort_greater() {
        let earlier = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(new_v7() > earlier);
    }

    #[test]
    fn embedded_timestamp_tracks_the_clock() {
        let lower = Utc::now() - Duration::milliseconds(1);
        let id = new_v7();
        let upper = Utc::now() + Duration::milliseconds(1);

        let at = extract_timestamp(&id).unwrap();
        assert!(at >= lower, "{at} vs {lower}");
        assert!(at <= upper, "{at} vs {upper}");
    }

    #[test]
    fn non_v7_ids_have_no_timestamp() {
        assert!(extract_timestamp(&Uuid::new_v4()).is_none());
        assert!(extract_timestamp(&Uuid::nil()).is_none());
    }
}
