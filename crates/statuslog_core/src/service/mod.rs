//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate detection, encoding, append and reconciliation.
//! - Wrap the record store so every mutation passes through the audit path.

pub mod change_pipeline;
pub mod tracked_service;
