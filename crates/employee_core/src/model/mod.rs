//! Employee domain model.
//!
//! # Responsibility
//! - Define the canonical employee record shared by repository and service.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by callers.
//! - Records are never deleted by the core.

pub mod employee;
