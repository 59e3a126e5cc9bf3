//! Command-line caller for the employee store.
//!
//! # Responsibility
//! - Map one subcommand to one service use case.
//! - Print the `ResultModel` outcome as JSON and exit with a matching code.
//!
//! Exit codes: `0` ok, `2` not found, `1` internal error or bad invocation.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use employee_core::{
    init_logging, AppConfig, Employee, EmployeeId, LoggingConfig, ResultModel, ResultStatus,
    SqliteEmployeeService, StoreConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "employee", version, about = "Employee store operations")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides `store.database_path` from the config file.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the store once and apply pending migrations.
    Init,
    /// Insert an employee with an explicit employee number.
    Add {
        #[arg(long)]
        number: String,
        #[command(flatten)]
        details: EmployeeArgs,
    },
    /// Insert an employee under the next employee number.
    Register {
        #[command(flatten)]
        details: EmployeeArgs,
    },
    /// Replace the mutable fields of an existing employee.
    Update {
        #[arg(long)]
        id: EmployeeId,
        #[command(flatten)]
        details: EmployeeArgs,
    },
    /// List every employee.
    List,
    /// Show the last issued employee number.
    LastNumber,
    /// Show the number the next registration would receive.
    NextNumber,
    /// Look an employee up by email.
    ByEmail { email: String },
    /// Look an employee up by mobile number.
    ByMobile { mobile: String },
}

#[derive(Debug, Args)]
struct EmployeeArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    mobile: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    joining_date: Option<String>,
}

impl EmployeeArgs {
    fn into_employee(self, number: impl Into<String>) -> Employee {
        let mut employee =
            Employee::new(number, self.email, self.mobile).with_name(self.first_name, self.last_name);
        employee.department = self.department;
        employee.designation = self.designation;
        employee.joining_date = self.joining_date;
        employee
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(status) => exit_code(status),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ResultStatus> {
    let config = resolve_config(cli.config.as_deref(), cli.database)?;
    init_logging(&config.logging).context("failed to initialize logging")?;
    let service = SqliteEmployeeService::from_config(&config);

    let status = match cli.command {
        Command::Init => {
            service
                .connections()
                .initialize()
                .await
                .context("failed to initialize store")?;
            print_outcome(&ResultModel::ok(config.store.database_path.display().to_string()))?
        }
        Command::Add { number, details } => {
            print_outcome(&service.add_employee(&details.into_employee(number)).await)?
        }
        Command::Register { details } => {
            print_outcome(&service.register_employee(details.into_employee("")).await)?
        }
        Command::Update { id, details } => {
            let employee = details.into_employee("").with_id(id);
            print_outcome(&service.update_employee(&employee).await)?
        }
        Command::List => print_outcome(&service.all_employees().await)?,
        Command::LastNumber => print_outcome(&service.last_employee_number().await)?,
        Command::NextNumber => print_outcome(&service.next_employee_number().await)?,
        Command::ByEmail { email } => print_outcome(&service.get_by_email(&email).await)?,
        Command::ByMobile { mobile } => print_outcome(&service.get_by_mobile(&mobile).await)?,
    };
    log::debug!("event=cli_command module=cli status={status:?}");
    Ok(status)
}

fn resolve_config(path: Option<&std::path::Path>, database: Option<PathBuf>) -> Result<AppConfig> {
    match (path, database) {
        (Some(path), database) => {
            let mut config = AppConfig::load(path)?;
            if let Some(database) = database {
                config.store.database_path = database;
            }
            Ok(config)
        }
        (None, Some(database)) => Ok(AppConfig {
            store: StoreConfig::new(database),
            logging: LoggingConfig {
                level: "warn".to_string(),
                log_dir: None,
            },
            numbering: Default::default(),
        }),
        (None, None) => bail!("either --config or --database is required"),
    }
}

fn print_outcome<T: Serialize>(outcome: &ResultModel<T>) -> Result<ResultStatus> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(outcome.status())
}

fn exit_code(status: ResultStatus) -> ExitCode {
    match status {
        ResultStatus::Ok => ExitCode::SUCCESS,
        ResultStatus::NotFound => ExitCode::from(2),
        ResultStatus::InternalServerError => ExitCode::from(1),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_register_with_profile_fields() {
        let cli = Cli::try_parse_from([
            "employee",
            "--database",
            "/tmp/staff.db",
            "register",
            "--email",
            "a@x.com",
            "--mobile",
            "555-0100",
            "--department",
            "Ops",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("/tmp/staff.db")));
        match cli.command {
            Command::Register { details } => {
                let employee = details.into_employee("");
                assert_eq!(employee.email, "a@x.com");
                assert_eq!(employee.department.as_deref(), Some("Ops"));
                assert_eq!(employee.id, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_requires_an_id() {
        let err = Cli::try_parse_from([
            "employee",
            "update",
            "--email",
            "a@x.com",
            "--mobile",
            "555-0100",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--id"));
    }

    #[test]
    fn database_flag_alone_builds_a_config() {
        let config = resolve_config(None, Some(PathBuf::from("/tmp/staff.db"))).unwrap();
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/staff.db"));
        assert_eq!(config.numbering.prefix, "EMP-");
    }

    #[test]
    fn missing_store_location_is_rejected() {
        assert!(resolve_config(None, None).is_err());
    }
}
