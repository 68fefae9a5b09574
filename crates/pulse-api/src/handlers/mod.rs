//! Handler modules for pulse-api.

pub mod feed;
pub mod stats;
pub mod track;

pub use feed::subscribe_feed;
pub use stats::{get_stats, recent_searches};
pub use track::track_event;
