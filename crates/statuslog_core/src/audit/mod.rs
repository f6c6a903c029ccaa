//! Status-change audit log.
//!
//! # Responsibility
//! - Encode and parse project log lines (`codec`).
//! - Read and append the log through the file collaborator (`store`).
//! - Detect status transitions (`detector`) and backfill unlogged records
//!   (`reconcile`).
//!
//! # Invariants
//! - The log is append-only: no entry is edited or removed.
//! - Reconciliation is idempotent.

pub mod codec;
pub mod detector;
pub mod reconcile;
pub mod store;
