//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the record/field mutation API the tracked service delegates to.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`) in
//!   addition to DB transport errors.

pub mod record_repo;
