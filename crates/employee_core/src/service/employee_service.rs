//! Employee use-case service.
//!
//! # Responsibility
//! - Decide the transaction boundary of each use case.
//! - Compose connection scoping with repository calls.
//! - Report every outcome as a [`ResultModel`].
//!
//! # Invariants
//! - Every write use case runs in one scope: open, operate, then commit on
//!   success or roll back on any failure. The connection is always released.
//! - Connection failures become `InternalServerError`; nothing here panics
//!   or returns an error type.

use crate::config::{AppConfig, NumberingConfig};
use crate::db::{ConnectionManager, Scope, StoreConnection, StoreFault};
use crate::model::employee::{Employee, EmployeeId};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository, UpdateOutcome};
use crate::result::ResultModel;
use crate::service::numbering::next_employee_number;
use log::{error, info, warn};

/// Service over the SQLite repository.
pub type SqliteEmployeeService = EmployeeService<SqliteEmployeeRepository>;

/// Use-case facade over a connection manager and a repository.
pub struct EmployeeService<R: EmployeeRepository> {
    connections: ConnectionManager,
    repo: R,
    numbering: NumberingConfig,
}

impl SqliteEmployeeService {
    /// Builds the SQLite-backed service from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ConnectionManager::new(config.store.clone()),
            SqliteEmployeeRepository::new(),
            config.numbering.clone(),
        )
    }
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(connections: ConnectionManager, repo: R, numbering: NumberingConfig) -> Self {
        Self {
            connections,
            repo,
            numbering,
        }
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Inserts `employee` as given, including its employee number.
    pub async fn add_employee(&self, employee: &Employee) -> ResultModel<EmployeeId> {
        const EVENT: &str = "employee_add";
        let Some(scope) = self.open_scope(EVENT).await else {
            return ResultModel::internal_server_error();
        };

        match self.repo.add_new(employee, &scope).await {
            Ok(id) => {
                let result = finish(scope, EVENT, id).await;
                if result.is_ok() {
                    info!("event={EVENT} module=service status=ok employee_id={id}");
                }
                result
            }
            Err(_) => {
                abandon(scope, EVENT).await;
                ResultModel::internal_server_error()
            }
        }
    }

    /// Registers a new employee under the next employee number.
    ///
    /// The last issued number is read inside the same write scope, so two
    /// concurrent registrations cannot derive the same number.
    pub async fn register_employee(&self, employee: Employee) -> ResultModel<Employee> {
        const EVENT: &str = "employee_register";
        let Some(scope) = self.open_scope(EVENT).await else {
            return ResultModel::internal_server_error();
        };

        let ResultModel::Ok(last) = self.repo.last_employee_number(scope.connection()).await
        else {
            abandon(scope, EVENT).await;
            return ResultModel::internal_server_error();
        };

        let number = match next_employee_number(last.as_deref(), &self.numbering) {
            Ok(number) => number,
            Err(err) => {
                error!(
                    "event={EVENT} module=service status=error error_code=numbering_failed error={err}"
                );
                abandon(scope, EVENT).await;
                return ResultModel::internal_server_error();
            }
        };

        let record = Employee {
            id: None,
            employee_number: number,
            ..employee
        };
        match self.repo.add_new(&record, &scope).await {
            Ok(id) => {
                let result = finish(scope, EVENT, record.with_id(id)).await;
                if let ResultModel::Ok(registered) = &result {
                    info!(
                        "event={EVENT} module=service status=ok employee_id={id} employee_number={}",
                        registered.employee_number
                    );
                }
                result
            }
            Err(_) => {
                abandon(scope, EVENT).await;
                ResultModel::internal_server_error()
            }
        }
    }

    /// Replaces the mutable fields of an existing employee and returns the
    /// record as stored, re-read inside the same scope.
    ///
    /// A missing identifier or an identifier with no record is `NotFound`;
    /// a multi-row change or a store fault is `InternalServerError`. Both
    /// roll back.
    pub async fn update_employee(&self, employee: &Employee) -> ResultModel<Employee> {
        const EVENT: &str = "employee_update";
        let Some(scope) = self.open_scope(EVENT).await else {
            return ResultModel::internal_server_error();
        };

        match self.repo.update_employee_detailed(employee, &scope).await {
            Ok(UpdateOutcome::Updated) => {
                let stored = match employee.id {
                    Some(id) => self.repo.get_by_id(id, scope.connection()).await,
                    None => ResultModel::not_found(),
                };
                let ResultModel::Ok(stored) = stored else {
                    error!(
                        "event={EVENT} module=service status=error error_code=reread_failed entity={}",
                        employee.to_log_snapshot()
                    );
                    abandon(scope, EVENT).await;
                    return ResultModel::internal_server_error();
                };

                let result = finish(scope, EVENT, stored).await;
                if let ResultModel::Ok(updated) = &result {
                    info!(
                        "event={EVENT} module=service status=ok employee_id={} employee_number={}",
                        updated.id.unwrap_or_default(),
                        updated.employee_number
                    );
                }
                result
            }
            Ok(UpdateOutcome::NoMatch) | Err(StoreFault::MissingIdentifier) => {
                abandon(scope, EVENT).await;
                ResultModel::not_found()
            }
            Ok(UpdateOutcome::Ambiguous(rows)) => {
                error!(
                    "event={EVENT} module=service status=error error_code=ambiguous_update rows={rows} entity={}",
                    employee.to_log_snapshot()
                );
                abandon(scope, EVENT).await;
                ResultModel::internal_server_error()
            }
            Err(_) => {
                abandon(scope, EVENT).await;
                ResultModel::internal_server_error()
            }
        }
    }

    /// Every employee, ordered by identifier.
    pub async fn all_employees(&self) -> ResultModel<Vec<Employee>> {
        let Some(conn) = self.open_connection("employee_list").await else {
            return ResultModel::internal_server_error();
        };
        let listed = self.repo.all_employees(&conn).await;
        conn.release().await;

        match listed {
            Ok(employees) => ResultModel::ok(employees),
            Err(_) => ResultModel::internal_server_error(),
        }
    }

    /// Last issued employee number; `Ok(None)` for an empty store.
    pub async fn last_employee_number(&self) -> ResultModel<Option<String>> {
        let Some(conn) = self.open_connection("employee_last_number").await else {
            return ResultModel::internal_server_error();
        };
        let last = self.repo.last_employee_number(&conn).await;
        conn.release().await;
        last
    }

    /// The number [`EmployeeService::register_employee`] would assign now.
    pub async fn next_employee_number(&self) -> ResultModel<String> {
        const EVENT: &str = "employee_next_number";
        let ResultModel::Ok(last) = self.last_employee_number().await else {
            return ResultModel::internal_server_error();
        };

        match next_employee_number(last.as_deref(), &self.numbering) {
            Ok(number) => ResultModel::ok(number),
            Err(err) => {
                error!(
                    "event={EVENT} module=service status=error error_code=numbering_failed error={err}"
                );
                ResultModel::internal_server_error()
            }
        }
    }

    pub async fn get_by_email(&self, email: &str) -> ResultModel<Employee> {
        let Some(conn) = self.open_connection("employee_get_by_email").await else {
            return ResultModel::internal_server_error();
        };
        let found = self.repo.get_by_email(email, &conn).await;
        conn.release().await;
        found
    }

    pub async fn get_by_mobile(&self, mobile: &str) -> ResultModel<Employee> {
        let Some(conn) = self.open_connection("employee_get_by_mobile").await else {
            return ResultModel::internal_server_error();
        };
        let found = self.repo.get_by_mobile(mobile, &conn).await;
        conn.release().await;
        found
    }

    async fn open_scope(&self, event: &str) -> Option<Scope> {
        match self.connections.open_scope().await {
            Ok(scope) => Some(scope),
            Err(err) => {
                error!(
                    "event={event} module=service status=error error_code=connection_failed error={err}"
                );
                None
            }
        }
    }

    async fn open_connection(&self, event: &str) -> Option<StoreConnection> {
        match self.connections.open_connection().await {
            Ok(conn) => Some(conn),
            Err(err) => {
                error!(
                    "event={event} module=service status=error error_code=connection_failed error={err}"
                );
                None
            }
        }
    }
}

/// Commits `scope` and wraps `value`, or reports the commit failure.
async fn finish<T>(scope: Scope, event: &str, value: T) -> ResultModel<T> {
    match scope.commit().await {
        Ok(()) => ResultModel::ok(value),
        Err(err) => {
            error!("event={event} module=service status=error error_code=commit_failed error={err}");
            ResultModel::internal_server_error()
        }
    }
}

async fn abandon(scope: Scope, event: &str) {
    if let Err(err) = scope.rollback().await {
        warn!("event={event} module=service status=error error_code=rollback_failed error={err}");
    }
}
