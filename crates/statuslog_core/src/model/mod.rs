//! Domain model for tracked records and audit log entries.
//!
//! # Responsibility
//! - Define the record shape consumed from the note store.
//! - Define the one-line audit entry appended to the project log.
//!
//! # Invariants
//! - Records are identified by a unique path-like id.
//! - Log entries are immutable once written.

pub mod entry;
pub mod record;
