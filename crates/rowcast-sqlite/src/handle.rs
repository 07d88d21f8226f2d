//! `Handle`: one open SQLite connection and the statements prepared on it.
//!
//! Statements borrow the handle, so a handle cannot be closed while a cursor
//! over it is alive. Handles are single-threaded; open one per thread.

use std::path::{Path, PathBuf};

use rowcast_core::{Operation, RowcastConfig, RowcastError, RowcastResult};
use rusqlite::{Connection, DatabaseName};
use tracing::{debug, info, warn};

use crate::ffi::RawStatement;
use crate::native::NativeError;
use crate::statement::HandleStatement;

/// Cursor type produced by [`Handle::prepare`].
pub type Statement<'conn> = HandleStatement<RawStatement<'conn>>;

pub struct Handle {
    conn: Connection,
    path: Option<PathBuf>,
    config: RowcastConfig,
}

impl Handle {
    /// Opens (or creates) a database file. Parent directories are created and
    /// the connection PRAGMAs are applied before the handle is returned.
    pub fn open(path: impl AsRef<Path>, config: &RowcastConfig) -> RowcastResult<Self> {
        config.connection.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| engine_error(Operation::Open, e, None))?;
        let handle = Self {
            conn,
            path: Some(path.to_path_buf()),
            config: config.clone(),
        };
        handle.apply_pragmas()?;
        info!(path = %path.display(), "opened database");
        Ok(handle)
    }

    pub fn open_in_memory(config: &RowcastConfig) -> RowcastResult<Self> {
        config.connection.validate()?;
        let conn =
            Connection::open_in_memory().map_err(|e| engine_error(Operation::Open, e, None))?;
        let handle = Self {
            conn,
            path: None,
            config: config.clone(),
        };
        handle.apply_pragmas()?;
        debug!("opened in-memory database");
        Ok(handle)
    }

    fn apply_pragmas(&self) -> RowcastResult<()> {
        let batch = self.config.connection.pragma_batch();
        self.conn
            .execute_batch(&batch)
            .map_err(|e| engine_error(Operation::Config, e, Some(batch.as_str())))
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &RowcastConfig {
        &self.config
    }

    /// Compiles the first statement of `sql` into a cursor.
    pub fn prepare(&self, sql: &str) -> RowcastResult<Statement<'_>> {
        if sql.trim().is_empty() {
            return Err(RowcastError::misuse(Operation::Prepare, "empty SQL"));
        }
        let raw = RawStatement::prepare(&self.conn, sql)
            .map_err(|e| e.into_error(Operation::Prepare, Some(sql)))?;
        debug!(sql, "prepared statement");
        Ok(HandleStatement::new(raw, self.config.cursor.finalize_on_error))
    }

    /// Runs one or more `;`-separated statements, discarding any rows.
    pub fn exec(&self, sql: &str) -> RowcastResult<()> {
        if sql.trim().is_empty() {
            return Err(RowcastError::misuse(Operation::Exec, "empty SQL"));
        }
        debug!(sql, "exec");
        self.conn
            .execute_batch(sql)
            .map_err(|e| engine_error(Operation::Exec, e, Some(sql)))
    }

    // ─── Transactions ───────────────────────────────────────────────────

    pub fn begin(&self) -> RowcastResult<()> {
        self.transaction_command("BEGIN IMMEDIATE")
    }

    pub fn commit(&self) -> RowcastResult<()> {
        self.transaction_command("COMMIT")
    }

    pub fn rollback(&self) -> RowcastResult<()> {
        self.transaction_command("ROLLBACK")
    }

    pub fn is_in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn transaction_command(&self, sql: &str) -> RowcastResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| engine_error(Operation::Transaction, e, Some(sql)))
    }

    /// Runs `f` inside a transaction: committed on `Ok`, rolled back on `Err`.
    pub fn run_transaction<T, F>(&self, f: F) -> RowcastResult<T>
    where
        F: FnOnce(&Self) -> RowcastResult<T>,
    {
        self.begin()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback() {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Runs `f` inside the caller's open transaction, or inside a new one
    /// when the connection is in autocommit mode.
    pub fn run_embedded_transaction<T, F>(&self, f: F) -> RowcastResult<T>
    where
        F: FnOnce(&Self) -> RowcastResult<T>,
    {
        if self.is_in_transaction() {
            f(self)
        } else {
            self.run_transaction(f)
        }
    }

    // ─── Connection state ───────────────────────────────────────────────

    pub fn last_inserted_row_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Rows changed by the most recent INSERT/UPDATE/DELETE.
    pub fn changes(&self) -> i64 {
        i64::try_from(self.conn.changes()).unwrap_or(i64::MAX)
    }

    pub fn is_readonly(&self) -> RowcastResult<bool> {
        self.conn
            .is_readonly(DatabaseName::Main)
            .map_err(|e| engine_error(Operation::Open, e, None))
    }
}

// ─── Helper: RowcastError from rusqlite ─────────────────────────────────────

fn engine_error(operation: Operation, e: rusqlite::Error, sql: Option<&str>) -> RowcastError {
    let extended_code = match &e {
        rusqlite::Error::SqliteFailure(err, _) => err.extended_code,
        _ => rusqlite::ffi::SQLITE_ERROR,
    };
    NativeError::new(extended_code, e.to_string()).into_error(operation, sql)
}
