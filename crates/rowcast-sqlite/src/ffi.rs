//! `sqlite3_stmt` wrapper. All unsafe code of the crate lives here.
//!
//! rusqlite's safe `Statement`/`Rows` pair ties the row iterator to a borrow
//! of the statement, which rules out a cursor that owns its stepping state.
//! `RawStatement` talks to the same bundled engine through `rusqlite::ffi`.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use rusqlite::{ffi, Connection};

use crate::native::{NativeError, NativeStatement};

/// A prepared statement borrowed from an open [`Connection`].
pub struct RawStatement<'conn> {
    stmt: *mut ffi::sqlite3_stmt,
    db: *mut ffi::sqlite3,
    _conn: PhantomData<&'conn Connection>,
}

impl<'conn> RawStatement<'conn> {
    /// Compiles the first statement of `sql`. Trailing text is ignored.
    pub fn prepare(conn: &'conn Connection, sql: &str) -> Result<Self, NativeError> {
        let c_sql = CString::new(sql)
            .map_err(|_| NativeError::new(ffi::SQLITE_MISUSE, "SQL contains a NUL byte"))?;
        // SAFETY: the handle stays valid for 'conn, which outlives the statement.
        let db = unsafe { conn.handle() };
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        // SAFETY: db is open, c_sql is NUL-terminated, stmt is a valid out-pointer.
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(db, c_sql.as_ptr(), -1, &mut stmt, ptr::null_mut())
        };
        if rc != ffi::SQLITE_OK {
            if !stmt.is_null() {
                // SAFETY: stmt came from prepare and is finalized once.
                unsafe { ffi::sqlite3_finalize(stmt) };
            }
            return Err(db_error(db, rc));
        }
        if stmt.is_null() {
            return Err(NativeError::new(ffi::SQLITE_MISUSE, "SQL contains no statement"));
        }
        Ok(Self {
            stmt,
            db,
            _conn: PhantomData,
        })
    }

    fn check(&self, rc: c_int) -> Result<(), NativeError> {
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(db_error(self.db, rc))
        }
    }
}

fn db_error(db: *mut ffi::sqlite3, rc: c_int) -> NativeError {
    // SAFETY: db is an open connection; errmsg returns a NUL-terminated string
    // owned by SQLite that is copied before any further call.
    let (extended, message) = unsafe {
        let extended = ffi::sqlite3_extended_errcode(db);
        let message = c_string(ffi::sqlite3_errmsg(db));
        (extended, message)
    };
    // errcode reflects the last API call, which can be stale for step failures.
    let extended = if extended & 0xff == rc & 0xff { extended } else { rc };
    NativeError::new(extended, message)
}

/// Copies a C string owned by SQLite. NULL reads as empty.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string.
unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn to_c_index(index: usize) -> c_int {
    c_int::try_from(index).unwrap_or(c_int::MAX)
}

fn too_big(len: usize) -> NativeError {
    NativeError::new(ffi::SQLITE_TOOBIG, format!("{len} bytes exceed the bind limit"))
}

impl NativeStatement for RawStatement<'_> {
    fn step(&mut self) -> Result<bool, NativeError> {
        // SAFETY: self.stmt is a live prepared statement.
        let rc = unsafe { ffi::sqlite3_step(self.stmt) };
        match rc {
            ffi::SQLITE_ROW => Ok(true),
            ffi::SQLITE_DONE => Ok(false),
            _ => Err(db_error(self.db, rc)),
        }
    }

    fn reset(&mut self) {
        // The return code repeats the last step failure, already reported.
        // SAFETY: self.stmt is a live prepared statement.
        unsafe { ffi::sqlite3_reset(self.stmt) };
    }

    fn clear_bindings(&mut self) {
        // SAFETY: self.stmt is a live prepared statement.
        unsafe { ffi::sqlite3_clear_bindings(self.stmt) };
    }

    fn bind_integer(&mut self, index: usize, value: i64) -> Result<(), NativeError> {
        // SAFETY: self.stmt is a live prepared statement.
        let rc = unsafe { ffi::sqlite3_bind_int64(self.stmt, to_c_index(index), value) };
        self.check(rc)
    }

    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), NativeError> {
        // SAFETY: self.stmt is a live prepared statement.
        let rc = unsafe { ffi::sqlite3_bind_double(self.stmt, to_c_index(index), value) };
        self.check(rc)
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), NativeError> {
        let len = c_int::try_from(value.len()).map_err(|_| too_big(value.len()))?;
        // SAFETY: SQLITE_TRANSIENT makes SQLite copy the bytes before returning.
        let rc = unsafe {
            ffi::sqlite3_bind_text(
                self.stmt,
                to_c_index(index),
                value.as_ptr().cast::<c_char>(),
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        };
        self.check(rc)
    }

    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), NativeError> {
        let rc = if value.is_empty() {
            // A NULL data pointer would bind SQL NULL instead of an empty blob.
            // SAFETY: self.stmt is a live prepared statement.
            unsafe { ffi::sqlite3_bind_zeroblob(self.stmt, to_c_index(index), 0) }
        } else {
            let len = c_int::try_from(value.len()).map_err(|_| too_big(value.len()))?;
            // SAFETY: SQLITE_TRANSIENT makes SQLite copy the bytes before returning.
            unsafe {
                ffi::sqlite3_bind_blob(
                    self.stmt,
                    to_c_index(index),
                    value.as_ptr().cast(),
                    len,
                    ffi::SQLITE_TRANSIENT(),
                )
            }
        };
        self.check(rc)
    }

    fn bind_null(&mut self, index: usize) -> Result<(), NativeError> {
        // SAFETY: self.stmt is a live prepared statement.
        let rc = unsafe { ffi::sqlite3_bind_null(self.stmt, to_c_index(index)) };
        self.check(rc)
    }

    fn bind_parameter_index(&self, name: &str) -> Option<usize> {
        let c_name = CString::new(name).ok()?;
        // SAFETY: self.stmt is live and c_name is NUL-terminated.
        let index = unsafe { ffi::sqlite3_bind_parameter_index(self.stmt, c_name.as_ptr()) };
        usize::try_from(index).ok().filter(|&i| i > 0)
    }

    fn get_integer(&self, index: usize) -> i64 {
        // SAFETY: self.stmt is live; out-of-range columns read as 0.
        unsafe { ffi::sqlite3_column_int64(self.stmt, to_c_index(index)) }
    }

    fn get_double(&self, index: usize) -> f64 {
        // SAFETY: self.stmt is live; out-of-range columns read as 0.0.
        unsafe { ffi::sqlite3_column_double(self.stmt, to_c_index(index)) }
    }

    fn get_text(&self, index: usize) -> String {
        let column = to_c_index(index);
        // SAFETY: the text pointer is valid until the next step/reset/finalize;
        // column_bytes is called after column_text as SQLite requires, and the
        // bytes are copied before returning.
        unsafe {
            let text = ffi::sqlite3_column_text(self.stmt, column);
            if text.is_null() {
                return String::new();
            }
            let len = usize::try_from(ffi::sqlite3_column_bytes(self.stmt, column)).unwrap_or(0);
            String::from_utf8_lossy(slice::from_raw_parts(text, len)).into_owned()
        }
    }

    fn get_blob(&self, index: usize) -> Vec<u8> {
        let column = to_c_index(index);
        // SAFETY: same contract as get_text.
        unsafe {
            let blob = ffi::sqlite3_column_blob(self.stmt, column);
            if blob.is_null() {
                return Vec::new();
            }
            let len = usize::try_from(ffi::sqlite3_column_bytes(self.stmt, column)).unwrap_or(0);
            slice::from_raw_parts(blob.cast::<u8>(), len).to_vec()
        }
    }

    fn column_type_code(&self, index: usize) -> i32 {
        // SAFETY: self.stmt is live; out-of-range columns report SQLITE_NULL.
        unsafe { ffi::sqlite3_column_type(self.stmt, to_c_index(index)) }
    }

    fn column_count(&self) -> usize {
        // SAFETY: self.stmt is a live prepared statement.
        let count = unsafe { ffi::sqlite3_column_count(self.stmt) };
        usize::try_from(count).unwrap_or(0)
    }

    fn column_name(&self, index: usize) -> String {
        // SAFETY: self.stmt is live; the name is copied immediately.
        unsafe { c_string(ffi::sqlite3_column_name(self.stmt, to_c_index(index))) }
    }

    fn column_table_name(&self, index: usize) -> String {
        // SAFETY: self.stmt is live; NULL for expressions, copied immediately.
        unsafe { c_string(ffi::sqlite3_column_table_name(self.stmt, to_c_index(index))) }
    }

    fn column_origin_name(&self, index: usize) -> String {
        // SAFETY: self.stmt is live; NULL for expressions, copied immediately.
        unsafe { c_string(ffi::sqlite3_column_origin_name(self.stmt, to_c_index(index))) }
    }

    fn is_readonly(&self) -> bool {
        // SAFETY: self.stmt is a live prepared statement.
        unsafe { ffi::sqlite3_stmt_readonly(self.stmt) != 0 }
    }

    fn last_insert_rowid(&self) -> i64 {
        // SAFETY: self.db is the open connection the statement belongs to.
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    fn changes(&self) -> i64 {
        // SAFETY: self.db is the open connection the statement belongs to.
        i64::from(unsafe { ffi::sqlite3_changes(self.db) })
    }

    fn sql(&self) -> String {
        // SAFETY: self.stmt is live; the text is copied immediately.
        unsafe { c_string(ffi::sqlite3_sql(self.stmt)) }
    }

    fn finalize(mut self) {
        self.release();
    }
}

impl RawStatement<'_> {
    fn release(&mut self) {
        if !self.stmt.is_null() {
            // SAFETY: stmt is live and nulled right after, so it is finalized once.
            unsafe { ffi::sqlite3_finalize(self.stmt) };
            self.stmt = ptr::null_mut();
        }
    }
}

impl Drop for RawStatement<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
