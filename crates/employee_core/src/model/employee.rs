//! Employee record.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it on insert, then immutable.
//! - `employee_number`, `email` and `mobile` are unique across all records;
//!   the store enforces this with unique constraints.

use serde::{Deserialize, Serialize};

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

/// One employee record.
///
/// Profile fields beyond the unique keys are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub employee_number: String,
    pub email: String,
    pub mobile: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    /// ISO-8601 date, stored as text.
    #[serde(default)]
    pub joining_date: Option<String>,
}

impl Employee {
    /// Creates an unsaved record with the three unique keys set.
    pub fn new(
        employee_number: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            employee_number: employee_number.into(),
            email: email.into(),
            mobile: mobile.into(),
            first_name: String::new(),
            last_name: String::new(),
            department: None,
            designation: None,
            joining_date: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Returns a copy carrying the store-assigned identifier.
    pub fn with_id(mut self, id: EmployeeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// JSON snapshot for diagnostics. Never fails; a serializer error is
    /// reported inline instead.
    pub fn to_log_snapshot(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|err| format!("{{\"unserializable\":\"{err}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::Employee;

    #[test]
    fn new_employee_is_unsaved() {
        let employee = Employee::new("EMP-0001", "a@x.com", "555-0100");
        assert!(!employee.is_persisted());
        assert_eq!(employee.with_id(7).id, Some(7));
    }

    #[test]
    fn log_snapshot_is_single_line_json() {
        let employee = Employee::new("EMP-0001", "a@x.com", "555-0100").with_name("Ada", "Lovelace");
        let snapshot = employee.to_log_snapshot();

        assert!(!snapshot.contains('\n'));
        let parsed: Employee = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed, employee);
    }

    #[test]
    fn deserializes_with_only_unique_keys() {
        let employee: Employee = serde_json::from_str(
            r#"{"employee_number":"EMP-0002","email":"b@x.com","mobile":"555-0101"}"#,
        )
        .unwrap();
        assert_eq!(employee.id, None);
        assert!(employee.first_name.is_empty());
        assert_eq!(employee.department, None);
    }
}
