//! Service layer for business logic.

pub mod notifier;
pub mod recorder;

pub use notifier::spawn_claim_notification;
pub use recorder::EventRecorder;
