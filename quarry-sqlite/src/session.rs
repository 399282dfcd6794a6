use crate::{
    CBox, bind::bind_value, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_changes64, sqlite3_close,
    sqlite3_column_count, sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid,
    sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt,
};
use quarry_core::{Error, Result, Rows, RowsAffected, ScanTarget, Session, Value};
use std::{
    collections::VecDeque,
    ffi::{CStr, CString, c_int},
    ptr,
    sync::Arc,
};
use tokio::{sync::Mutex, task::spawn_blocking};

/// [`Session`] over a single SQLite connection.
///
/// Statements are serialized on the connection and run on the blocking thread pool. The
/// connection stays locked until the blocking work ends, also when the caller stops waiting.
pub struct SqliteSession {
    connection: Arc<Mutex<CBox<*mut sqlite3>>>,
}

impl SqliteSession {
    /// Opens `sqlite://<path>` or a bare path, URI parameters (`?mode=rwc`) are accepted.
    /// `:memory:` opens a private in-memory database.
    pub async fn connect(url: &str) -> Result<SqliteSession> {
        let location = match url.strip_prefix("sqlite://") {
            Some(location) => location,
            None if url.contains("://") && !url.starts_with("file:") => {
                let error = Error::msg(format!("Expected a `sqlite://` URL, found `{url}`"));
                log::error!("{error:#}");
                return Err(error);
            }
            None => url,
        };
        // Only names starting with `file:` are parsed as URIs
        let location = if location.starts_with("file:") {
            location.to_string()
        } else {
            format!("file:{location}")
        };
        let location = CString::new(location)
            .map_err(|e| Error::msg(format!("Error while decoding connection URL `{url}`: {e}")))?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                location.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let error = Error::msg(format!(
                "Could not open `{url}`: {}",
                error_message_from_ptr(unsafe { sqlite3_errmsg(*connection) })
            ));
            log::error!("{error:#}");
            return Err(error);
        }
        log::debug!("Opened sqlite database `{url}`");
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Prepares `sql`, binds `args` and hands the statement to `run` on a blocking thread.
    async fn run<R: Send + 'static>(
        &self,
        sql: &str,
        args: &[Value],
        run: fn(*mut sqlite3, *mut sqlite3_stmt) -> Result<R>,
    ) -> Result<R> {
        let guard = self.connection.clone().lock_owned().await;
        let sql = sql.to_string();
        let args = args.to_vec();
        spawn_blocking(move || {
            let connection = **guard;
            let statement = prepare(connection, &sql)?;
            for (i, arg) in args.iter().enumerate() {
                bind_value(*statement, i as c_int + 1, arg)?;
            }
            run(connection, *statement)
        })
        .await
        .map_err(|e| Error::msg(format!("The sqlite worker failed: {e}")))?
    }
}

fn last_error(connection: *mut sqlite3) -> Error {
    let error = Error::msg(error_message_from_ptr(unsafe { sqlite3_errmsg(connection) }).to_string());
    log::error!("{error:#}");
    error
}

fn prepare(connection: *mut sqlite3, sql: &str) -> Result<CBox<*mut sqlite3_stmt>> {
    let query = CString::new(sql).map_err(|e| {
        let error = Error::msg(format!("Could not create a CString from the query: {e}"));
        log::error!("{error:#}");
        error
    })?;
    let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
        sqlite3_finalize(p);
    });
    let mut tail = ptr::null();
    unsafe {
        let rc = sqlite3_prepare_v2(
            connection,
            query.as_ptr(),
            query.as_bytes().len() as c_int,
            &mut *statement,
            &mut tail,
        );
        if rc != SQLITE_OK {
            return Err(last_error(connection));
        }
        if !tail.is_null() && !CStr::from_ptr(tail).to_bytes().trim_ascii().is_empty() {
            let error = Error::msg("Cannot run more than one statement at a time");
            log::error!("{error:#}");
            return Err(error);
        }
    }
    if statement.is_null() {
        return Err(Error::msg("The query does not contain any statement"));
    }
    Ok(statement)
}

fn fetch_rows(connection: *mut sqlite3, statement: *mut sqlite3_stmt) -> Result<SqliteRows> {
    unsafe {
        let count = sqlite3_column_count(statement);
        let columns = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<Result<Vec<_>>>()?;
        let mut rows = VecDeque::new();
        loop {
            match sqlite3_step(statement) {
                SQLITE_BUSY => continue,
                SQLITE_DONE => break,
                SQLITE_ROW => rows.push_back(
                    (0..count)
                        .map(|i| extract_value(statement, i))
                        .collect::<Result<Vec<_>>>()?,
                ),
                _ => return Err(last_error(connection)),
            }
        }
        Ok(SqliteRows {
            columns,
            rows,
            current: None,
        })
    }
}

fn execute(connection: *mut sqlite3, statement: *mut sqlite3_stmt) -> Result<RowsAffected> {
    unsafe {
        loop {
            match sqlite3_step(statement) {
                SQLITE_BUSY | SQLITE_ROW => continue,
                SQLITE_DONE => break,
                _ => return Err(last_error(connection)),
            }
        }
        let rows_affected = sqlite3_changes64(connection);
        Ok(RowsAffected {
            rows_affected: rows_affected.max(0) as u64,
            last_insert_id: Some(sqlite3_last_insert_rowid(connection)),
        })
    }
}

impl Session for SqliteSession {
    type Rows = SqliteRows;

    async fn query_context(&self, sql: &str, args: &[Value]) -> Result<SqliteRows> {
        self.run(sql, args, fetch_rows).await
    }

    async fn exec_context(&self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.run(sql, args, execute).await
    }
}

/// Result set, fully read when the query completes.
#[derive(Debug)]
pub struct SqliteRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl Rows for SqliteRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next(&mut self) -> Result<bool> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn scan(&mut self, targets: &mut [&mut dyn ScanTarget]) -> Result<()> {
        let Some(row) = self.current.take() else {
            return Err(Error::msg("No current row, call next before scan"));
        };
        if row.len() != targets.len() {
            return Err(Error::msg(format!(
                "Expected {} scan targets, got {}",
                row.len(),
                targets.len()
            )));
        }
        for (target, value) in targets.iter_mut().zip(row) {
            let value = if value.is_null() {
                target.prototype()
            } else {
                value
            };
            target.assign(value)?;
        }
        Ok(())
    }
}
