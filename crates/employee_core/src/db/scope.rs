//! Unit-of-work scoping over store connections.
//!
//! # Responsibility
//! - Acquire one connection per use case, optionally with a transaction.
//! - Commit or roll back, then release the connection, exactly once.
//!
//! # Invariants
//! - A [`Scope`] owns its connection; it is neither `Clone` nor shared.
//! - At most one transaction is active per scope, begun when it opens.
//! - A scope dropped before `commit`/`rollback` (error path, panic, or a
//!   cancelled future) closes its connection, and SQLite discards the open
//!   transaction on close.

use super::open::open_store;
use super::{ConnectionError, StoreFault};
use crate::config::StoreConfig;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use uuid::Uuid;

/// Opens store connections and transaction scopes from explicit configuration.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    config: StoreConfig,
}

impl ConnectionManager {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens and releases one connection so migration and reachability
    /// problems surface at startup rather than on the first request.
    pub async fn initialize(&self) -> Result<(), ConnectionError> {
        let conn = self.open_connection().await?;
        conn.release().await;
        info!(
            "event=store_init module=db status=ok path={}",
            self.config.database_path.display()
        );
        Ok(())
    }

    /// Opens a connection without a transaction, for read-only use cases.
    pub async fn open_connection(&self) -> Result<StoreConnection, ConnectionError> {
        let inner = open_store(&self.config).await?;
        Ok(StoreConnection { inner })
    }

    /// Opens a connection and begins an immediate transaction on it.
    ///
    /// `BEGIN IMMEDIATE` takes the store's write lock up front, so two write
    /// scopes never interleave a read-then-write sequence.
    pub async fn open_scope(&self) -> Result<Scope, ConnectionError> {
        let conn = self.open_connection().await?;
        let scope_id = Uuid::new_v4();

        if let Err(source) = conn.execute_control("BEGIN IMMEDIATE;").await {
            error!(
                "event=scope_open module=db status=error scope_id={} error_code=begin_failed error={}",
                scope_id, source
            );
            conn.release().await;
            return Err(ConnectionError::Begin {
                path: self.config.database_path.clone(),
                source,
            });
        }

        debug!("event=scope_open module=db status=ok scope_id={}", scope_id);
        Ok(Scope {
            conn,
            guard: ScopeGuard {
                scope_id,
                finished: false,
            },
        })
    }
}

/// One open store connection.
///
/// Dropping it closes the connection; [`StoreConnection::release`] does the
/// same but waits for the close to finish and logs failures.
#[derive(Debug)]
pub struct StoreConnection {
    inner: tokio_rusqlite::Connection,
}

impl StoreConnection {
    /// Runs `function` on the connection's worker thread.
    ///
    /// This is the only suspension point for store work.
    pub async fn call<F, R>(&self, function: F) -> tokio_rusqlite::Result<R>
    where
        F: FnOnce(&mut Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.inner.call(function).await
    }

    /// Closes the connection.
    pub async fn release(self) {
        if let Err(err) = self.inner.close().await {
            warn!(
                "event=connection_release module=db status=error error={}",
                err
            );
        }
    }

    async fn execute_control(&self, sql: &'static str) -> tokio_rusqlite::Result<()> {
        self.call(move |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .await
    }
}

/// One connection plus the transaction begun on it.
///
/// Consumed by [`Scope::commit`] or [`Scope::rollback`], both of which release
/// the connection afterwards.
#[derive(Debug)]
pub struct Scope {
    conn: StoreConnection,
    guard: ScopeGuard,
}

impl Scope {
    /// Correlation id used in log lines for this unit of work.
    pub fn id(&self) -> Uuid {
        self.guard.scope_id
    }

    /// The connection the transaction is bound to, for reads and writes
    /// that must see the scope's uncommitted state.
    pub fn connection(&self) -> &StoreConnection {
        &self.conn
    }

    /// Commits the transaction and releases the connection.
    ///
    /// # Errors
    /// Returns the store fault when COMMIT fails; the transaction is rolled
    /// back and the connection released before returning.
    pub async fn commit(self) -> Result<(), StoreFault> {
        let Self { conn, mut guard } = self;

        match conn.execute_control("COMMIT;").await {
            Ok(()) => {
                guard.finished = true;
                debug!(
                    "event=scope_commit module=db status=ok scope_id={}",
                    guard.scope_id
                );
                conn.release().await;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=scope_commit module=db status=error scope_id={} error={}",
                    guard.scope_id, err
                );
                if let Err(rollback_err) = conn.execute_control("ROLLBACK;").await {
                    debug!(
                        "event=scope_rollback module=db status=skipped scope_id={} error={}",
                        guard.scope_id, rollback_err
                    );
                }
                guard.finished = true;
                conn.release().await;
                Err(err.into())
            }
        }
    }

    /// Rolls the transaction back and releases the connection.
    ///
    /// # Errors
    /// Returns the store fault when ROLLBACK fails. The connection is still
    /// released, which discards the transaction.
    pub async fn rollback(self) -> Result<(), StoreFault> {
        let Self { conn, mut guard } = self;

        let outcome = conn.execute_control("ROLLBACK;").await;
        guard.finished = true;
        match &outcome {
            Ok(()) => debug!(
                "event=scope_rollback module=db status=ok scope_id={}",
                guard.scope_id
            ),
            Err(err) => error!(
                "event=scope_rollback module=db status=error scope_id={} error={}",
                guard.scope_id, err
            ),
        }
        conn.release().await;
        outcome.map_err(StoreFault::from)
    }
}

#[derive(Debug)]
struct ScopeGuard {
    scope_id: Uuid,
    finished: bool,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "event=scope_drop module=db status=abandoned scope_id={} action=rollback_on_close",
                self.scope_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionManager;
    use crate::config::StoreConfig;
    use crate::db::StoreFault;

    fn manager(dir: &tempfile::TempDir) -> ConnectionManager {
        ConnectionManager::new(StoreConfig::new(dir.path().join("scope.sqlite3")))
    }

    async fn count_rows(manager: &ConnectionManager) -> i64 {
        let conn = manager.open_connection().await.unwrap();
        let count = conn
            .call(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        conn.release().await;
        count
    }

    async fn insert_in(scope: &super::Scope, email: &'static str) {
        scope
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO employees (employee_number, email, mobile) VALUES (?1, ?1, ?1);",
                    [email],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn committed_scope_persists_writes() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let scope = manager.open_scope().await.unwrap();
        insert_in(&scope, "committed@x.com").await;
        scope.commit().await.unwrap();

        assert_eq!(count_rows(&manager).await, 1);
    }

    #[tokio::test]
    async fn rolled_back_scope_discards_writes() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let scope = manager.open_scope().await.unwrap();
        insert_in(&scope, "rolled-back@x.com").await;
        scope.rollback().await.unwrap();

        assert_eq!(count_rows(&manager).await, 0);
    }

    #[tokio::test]
    async fn dropped_scope_discards_writes_and_frees_the_write_lock() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let scope = manager.open_scope().await.unwrap();
        insert_in(&scope, "dropped@x.com").await;
        drop(scope);

        let next = manager.open_scope().await.unwrap();
        insert_in(&next, "after-drop@x.com").await;
        next.commit().await.unwrap();

        assert_eq!(count_rows(&manager).await, 1);
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_and_frees_the_write_lock() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let scope = manager.open_scope().await.unwrap();
        insert_in(&scope, "doomed@x.com").await;
        scope
            .connection()
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE badge_owner (id INTEGER PRIMARY KEY);
                     CREATE TABLE badge (
                         owner_id INTEGER REFERENCES badge_owner(id)
                             DEFERRABLE INITIALLY DEFERRED
                     );
                     INSERT INTO badge (owner_id) VALUES (42);",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = scope.commit().await.unwrap_err();
        assert!(matches!(err, StoreFault::Store(_)));

        let next = manager.open_scope().await.unwrap();
        insert_in(&next, "after-failed-commit@x.com").await;
        next.commit().await.unwrap();

        assert_eq!(count_rows(&manager).await, 1);
        let conn = manager.open_connection().await.unwrap();
        let leftover: i64 = conn
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name IN ('badge', 'badge_owner');",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        conn.release().await;
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn scopes_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir);

        let first = manager.open_scope().await.unwrap();
        let first_id = first.id();
        first.rollback().await.unwrap();
        let second = manager.open_scope().await.unwrap();

        assert_ne!(first_id, second.id());
        second.rollback().await.unwrap();
    }
}
