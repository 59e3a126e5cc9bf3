//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repositories never open, commit or close connections; callers pass in
//!   the connection or scope to run against.
//! - Repositories never panic or propagate raw store errors untyped: every
//!   fault is logged with the operation name and returned as a value.

pub mod employee_repo;
