//! Audit trail for budget and expense mutations
//!
//! Every create, update and delete is appended to `audit.log` as one JSON
//! line holding the before/after values and a short field diff.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
