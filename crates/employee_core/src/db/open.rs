//! Connection bootstrap for the employee store.
//!
//! # Responsibility
//! - Open one SQLite connection on its own `tokio-rusqlite` worker thread.
//! - Configure pragmas and run pending migrations before handing it out.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and the configured busy timeout.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{ConnectionError, DbResult};
use crate::config::StoreConfig;
use log::{debug, error};
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Opens the configured database file and bootstraps it.
///
/// # Side effects
/// - Spawns the connection's background thread.
/// - Emits `db_open` logging events with duration and status.
pub(crate) async fn open_store(
    config: &StoreConfig,
) -> Result<tokio_rusqlite::Connection, ConnectionError> {
    let started_at = Instant::now();
    let path = config.database_path.clone();
    debug!(
        "event=db_open module=db status=start path={}",
        path.display()
    );

    let conn = match tokio_rusqlite::Connection::open(&path).await {
        Ok(conn) => conn,
        Err(source) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                source
            );
            return Err(ConnectionError::Open { path, source });
        }
    };

    let busy_timeout = config.busy_timeout();
    let bootstrapped = conn
        .call(move |conn| Ok(bootstrap_connection(conn, busy_timeout)))
        .await;

    match bootstrapped {
        Ok(Ok(())) => {
            debug!(
                "event=db_open module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Ok(Err(source)) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                source
            );
            Err(ConnectionError::Bootstrap { path, source })
        }
        Err(source) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_worker_failed error={}",
                started_at.elapsed().as_millis(),
                source
            );
            Err(ConnectionError::Open { path, source })
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
