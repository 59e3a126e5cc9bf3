//! Transactional access to the employee store.
//!
//! Callers go through [`EmployeeService`]; every use case returns a
//! [`ResultModel`] and never an error or a panic.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod result;
pub mod service;

pub use config::{AppConfig, ConfigError, LoggingConfig, NumberingConfig, StoreConfig};
pub use db::{ConnectionError, ConnectionManager, DbError, Scope, StoreConnection, StoreFault};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeId};
pub use repo::employee_repo::{
    EmployeeRepository, RepoResult, SqliteEmployeeRepository, UpdateOutcome,
};
pub use result::{ResultModel, ResultStatus};
pub use service::employee_service::{EmployeeService, SqliteEmployeeService};
pub use service::numbering::{next_employee_number, NumberingError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
