//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Run one parameterized statement per operation on a supplied connection.
//! - Turn store faults into logged, typed failures.
//!
//! # Invariants
//! - Writes run only inside a [`Scope`]; reads accept any [`StoreConnection`].
//! - Write failures are logged with a JSON snapshot of the input entity.
//! - `update_employee` is `true` only when exactly one row changed.

use crate::db::{Scope, StoreConnection, StoreFault};
use crate::model::employee::{Employee, EmployeeId};
use crate::result::ResultModel;
use crate::service::numbering::highest_issued;
use async_trait::async_trait;
use log::error;
use rusqlite::{params, OptionalExtension, Row, ToSql};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    employee_number,
    email,
    mobile,
    first_name,
    last_name,
    department,
    designation,
    joining_date
FROM employees";

pub type RepoResult<T> = Result<T, StoreFault>;

/// Detailed result of an update, for callers that need to tell "no such
/// record" from "more than one record changed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Exactly one row changed.
    Updated,
    /// No row carries the identifier.
    NoMatch,
    /// More than one row changed; a data anomaly.
    Ambiguous(usize),
}

impl UpdateOutcome {
    fn from_changed_rows(changed: usize) -> Self {
        match changed {
            1 => Self::Updated,
            0 => Self::NoMatch,
            other => Self::Ambiguous(other),
        }
    }
}

/// Repository interface for employee persistence.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Inserts `employee` and returns the store-assigned identifier.
    async fn add_new(&self, employee: &Employee, scope: &Scope) -> RepoResult<EmployeeId>;

    /// Replaces every mutable field of the record identified by `employee.id`.
    async fn update_employee_detailed(
        &self,
        employee: &Employee,
        scope: &Scope,
    ) -> RepoResult<UpdateOutcome>;

    /// `Ok(true)` iff exactly one row changed. Zero rows and several rows are
    /// both `Ok(false)`; use [`EmployeeRepository::update_employee_detailed`]
    /// to tell them apart.
    async fn update_employee(&self, employee: &Employee, scope: &Scope) -> RepoResult<bool> {
        let outcome = self.update_employee_detailed(employee, scope).await?;
        Ok(outcome == UpdateOutcome::Updated)
    }

    /// Every record, ordered by identifier.
    async fn all_employees(&self, conn: &StoreConnection) -> RepoResult<Vec<Employee>>;

    /// Highest issued employee number by trailing digit value, or `None`
    /// for an empty store. Insertion order plays no part.
    async fn last_employee_number(&self, conn: &StoreConnection) -> ResultModel<Option<String>>;

    async fn get_by_email(&self, email: &str, conn: &StoreConnection) -> ResultModel<Employee>;

    async fn get_by_mobile(&self, mobile: &str, conn: &StoreConnection) -> ResultModel<Employee>;

    async fn get_by_id(&self, id: EmployeeId, conn: &StoreConnection) -> ResultModel<Employee>;
}

/// SQLite-backed employee repository. Stateless; cheap to clone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEmployeeRepository;

impl SqliteEmployeeRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    async fn add_new(&self, employee: &Employee, scope: &Scope) -> RepoResult<EmployeeId> {
        let record = employee.clone();
        let inserted = scope
            .connection()
            .call(move |conn| {
                let id: i64 = conn.query_row(
                    "INSERT INTO employees (
                        employee_number,
                        email,
                        mobile,
                        first_name,
                        last_name,
                        department,
                        designation,
                        joining_date
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    RETURNING id;",
                    params![
                        record.employee_number,
                        record.email,
                        record.mobile,
                        record.first_name,
                        record.last_name,
                        record.department,
                        record.designation,
                        record.joining_date,
                    ],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await
            .map_err(StoreFault::from)
            .and_then(|id| {
                if id < 0 {
                    return Err(StoreFault::InvalidData(format!(
                        "store assigned negative id `{id}`"
                    )));
                }
                Ok(id)
            });

        if let Err(err) = &inserted {
            error!(
                "event=employee_add_new module=repo status=error scope_id={} error={} entity={}",
                scope.id(),
                err,
                employee.to_log_snapshot()
            );
        }
        inserted
    }

    async fn update_employee_detailed(
        &self,
        employee: &Employee,
        scope: &Scope,
    ) -> RepoResult<UpdateOutcome> {
        let updated = match employee.id {
            None => Err(StoreFault::MissingIdentifier),
            Some(id) => {
                let record = employee.clone();
                scope
                    .connection()
                    .call(move |conn| {
                        let changed = conn.execute(
                            "UPDATE employees
                             SET
                                email = ?1,
                                mobile = ?2,
                                first_name = ?3,
                                last_name = ?4,
                                department = ?5,
                                designation = ?6,
                                joining_date = ?7,
                                updated_at = (strftime('%s', 'now') * 1000)
                             WHERE id = ?8;",
                            params![
                                record.email,
                                record.mobile,
                                record.first_name,
                                record.last_name,
                                record.department,
                                record.designation,
                                record.joining_date,
                                id,
                            ],
                        )?;
                        Ok(changed)
                    })
                    .await
                    .map(UpdateOutcome::from_changed_rows)
                    .map_err(StoreFault::from)
            }
        };

        if let Err(err) = &updated {
            error!(
                "event=employee_update module=repo status=error scope_id={} error={} entity={}",
                scope.id(),
                err,
                employee.to_log_snapshot()
            );
        }
        updated
    }

    async fn all_employees(&self, conn: &StoreConnection) -> RepoResult<Vec<Employee>> {
        let listed = conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"))?;
                let employees = stmt
                    .query_map([], parse_employee_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(employees)
            })
            .await
            .map_err(StoreFault::from);

        if let Err(err) = &listed {
            error!(
                "event=employee_list module=repo status=error error={}",
                err
            );
        }
        listed
    }

    async fn last_employee_number(&self, conn: &StoreConnection) -> ResultModel<Option<String>> {
        let last = conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT employee_number FROM employees;")?;
                let numbers = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(highest_issued(numbers.iter().map(String::as_str)).map(str::to_owned))
            })
            .await;

        match last {
            Ok(number) => ResultModel::ok(number),
            Err(err) => {
                error!(
                    "event=employee_last_number module=repo status=error error={}",
                    err
                );
                ResultModel::internal_server_error()
            }
        }
    }

    async fn get_by_email(&self, email: &str, conn: &StoreConnection) -> ResultModel<Employee> {
        find_one(conn, Lookup::Email, email.to_owned()).await
    }

    async fn get_by_mobile(&self, mobile: &str, conn: &StoreConnection) -> ResultModel<Employee> {
        find_one(conn, Lookup::Mobile, mobile.to_owned()).await
    }

    async fn get_by_id(&self, id: EmployeeId, conn: &StoreConnection) -> ResultModel<Employee> {
        find_one(conn, Lookup::Id, id).await
    }
}

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Email,
    Mobile,
    Id,
}

impl Lookup {
    fn sql(self) -> String {
        let column = match self {
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Id => "id",
        };
        format!("{EMPLOYEE_SELECT_SQL} WHERE {column} = ?1;")
    }

    fn event(self) -> &'static str {
        match self {
            Self::Email => "employee_get_by_email",
            Self::Mobile => "employee_get_by_mobile",
            Self::Id => "employee_get_by_id",
        }
    }
}

async fn find_one<V>(conn: &StoreConnection, lookup: Lookup, value: V) -> ResultModel<Employee>
where
    V: ToSql + Send + 'static,
{
    let found = conn
        .call(move |conn| {
            let employee = conn
                .query_row(&lookup.sql(), [value], parse_employee_row)
                .optional()?;
            Ok(employee)
        })
        .await;

    match found {
        Ok(employee) => ResultModel::from_option(employee),
        Err(err) => {
            error!(
                "event={} module=repo status=error error={}",
                lookup.event(),
                err
            );
            ResultModel::internal_server_error()
        }
    }
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: Some(row.get("id")?),
        employee_number: row.get("employee_number")?,
        email: row.get("email")?,
        mobile: row.get("mobile")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        department: row.get("department")?,
        designation: row.get("designation")?,
        joining_date: row.get("joining_date")?,
    })
}
