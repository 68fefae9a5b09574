//! # pulse-core
//!
//! Core types, traits, and abstractions for the pulse engagement tracker.
//!
//! This crate provides the domain model (action kinds, events, claim
//! notifications), the live feed registry that fans recorded claims out to
//! connected viewers, and the trait seams the storage and API crates
//! implement.

pub mod action;
pub mod defaults;
pub mod error;
pub mod feed;
pub mod models;
pub mod temporal;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use action::ActionKind;
pub use error::{Error, Result};
pub use feed::{FeedFrame, LiveFeed, SubscriberId};
pub use models::*;
pub use temporal::{rolling_week_start, utc_day_bounds};
pub use traits::*;
pub use uuid_utils::{extract_timestamp, is_v7, new_v7};
