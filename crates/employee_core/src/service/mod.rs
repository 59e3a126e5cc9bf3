//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate connection scoping and repository calls into use cases.
//! - Keep callers (CLI, HTTP adapters) decoupled from storage details.

pub mod employee_service;
pub mod numbering;
