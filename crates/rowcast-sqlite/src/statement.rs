//! Statement cursor: typed binding, row stepping, column extraction.
//!
//! A `HandleStatement` moves through
//! `Prepared -> (HasRow)* -> Done`, back to `Prepared` on `reset`, and ends in
//! `Finalized`. Row values are only readable in `HasRow`; parameters are only
//! bindable in `Prepared`. The native statement is released exactly once,
//! either by `finalize`, by the finalize-on-error policy, or on drop.

use rowcast_core::{
    ColumnDecodable, ColumnEncodable, ColumnType, MultiRows, OneColumn, OneRow, Operation,
    RowcastError, RowcastResult, Value,
};
use tracing::{debug, trace, warn};

use crate::native::{column_type_from_code, NativeStatement};

/// Outcome of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Row,
    Done,
}

/// Lifecycle position of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Prepared,
    HasRow,
    Done,
    Finalized,
}

/// Metadata of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub name: String,
    /// Source table, empty for expressions.
    pub table_name: String,
    /// Source column before aliasing, empty for expressions.
    pub origin_name: String,
    /// Storage class of the current row's value; `Null` without a row.
    pub column_type: ColumnType,
}

/// Cursor over one prepared statement.
pub struct HandleStatement<S: NativeStatement> {
    native: Option<S>,
    state: CursorState,
    finalize_on_error: bool,
    sql: String,
}

impl<S: NativeStatement> HandleStatement<S> {
    pub fn new(native: S, finalize_on_error: bool) -> Self {
        let sql = native.sql();
        Self {
            native: Some(native),
            state: CursorState::Prepared,
            finalize_on_error,
            sql,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == CursorState::Finalized
    }

    /// SQL text the statement was prepared from. Kept after finalize.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn native(&self, operation: Operation) -> RowcastResult<&S> {
        self.native
            .as_ref()
            .ok_or(RowcastError::Finalized { operation })
    }

    fn native_mut(&mut self, operation: Operation) -> RowcastResult<&mut S> {
        self.native
            .as_mut()
            .ok_or(RowcastError::Finalized { operation })
    }

    fn row_native(&self, operation: Operation) -> RowcastResult<&S> {
        let native = self.native(operation)?;
        if self.state != CursorState::HasRow {
            return Err(RowcastError::misuse(
                operation,
                "no current row; step() must return Row first",
            ));
        }
        Ok(native)
    }

    // ─── Binding ───────────────────────────────────────────────────────

    /// Binds `value` to the 1-based parameter `index`.
    pub fn bind(&mut self, value: impl Into<Value>, index: usize) -> RowcastResult<()> {
        self.bind_value(&value.into(), index)
    }

    pub fn bind_value(&mut self, value: &Value, index: usize) -> RowcastResult<()> {
        if matches!(self.state, CursorState::HasRow | CursorState::Done) {
            return Err(RowcastError::misuse(
                Operation::Bind,
                "statement is stepping; reset() before binding",
            ));
        }
        let native = self.native_mut(Operation::Bind)?;
        let outcome = match value {
            Value::Null => native.bind_null(index),
            Value::Integer32(v) => native.bind_integer(index, i64::from(*v)),
            Value::Integer64(v) => native.bind_integer(index, *v),
            Value::Float(v) => native.bind_double(index, *v),
            Value::Text(v) => native.bind_text(index, v),
            Value::Blob(v) => native.bind_blob(index, v),
        };
        outcome.map_err(|e| e.into_error(Operation::Bind, Some(self.sql.as_str())))
    }

    /// Binds a host value through its column encoding.
    pub fn bind_column<T: ColumnEncodable + ?Sized>(
        &mut self,
        value: &T,
        index: usize,
    ) -> RowcastResult<()> {
        self.bind_value(&value.archived_value(), index)
    }

    /// Binds `values` to parameters `1..=values.len()`.
    pub fn bind_all(&mut self, values: &[Value]) -> RowcastResult<()> {
        for (offset, value) in values.iter().enumerate() {
            self.bind_value(value, offset + 1)?;
        }
        Ok(())
    }

    /// 1-based index of a named parameter (`:name`, `@name`, `$name`).
    pub fn bind_parameter_index(&self, name: &str) -> RowcastResult<Option<usize>> {
        Ok(self.native(Operation::Bind)?.bind_parameter_index(name))
    }

    // ─── Stepping ──────────────────────────────────────────────────────

    /// Advances the cursor. Stepping again after `Done` is permitted and
    /// restarts the statement the way SQLite does.
    ///
    /// On failure the statement is finalized first when the finalize-on-error
    /// policy is set; otherwise it is left in `Done` and must be reset.
    pub fn step(&mut self) -> RowcastResult<StepResult> {
        let outcome = self.native_mut(Operation::Step)?.step();
        match outcome {
            Ok(true) => {
                self.state = CursorState::HasRow;
                Ok(StepResult::Row)
            }
            Ok(false) => {
                self.state = CursorState::Done;
                Ok(StepResult::Done)
            }
            Err(e) => {
                let err = e.into_error(Operation::Step, Some(self.sql.as_str()));
                warn!(sql = %self.sql, error = %err, "step failed");
                if self.finalize_on_error {
                    self.finalize();
                } else {
                    self.state = CursorState::Done;
                }
                Err(err)
            }
        }
    }

    /// Rewinds to `Prepared`. Bindings are kept.
    pub fn reset(&mut self) -> RowcastResult<()> {
        self.native_mut(Operation::Reset)?.reset();
        self.state = CursorState::Prepared;
        Ok(())
    }

    /// Sets every parameter to NULL. Only valid while `Prepared`.
    pub fn clear_bindings(&mut self) -> RowcastResult<()> {
        if matches!(self.state, CursorState::HasRow | CursorState::Done) {
            return Err(RowcastError::misuse(
                Operation::Bind,
                "statement is stepping; reset() before clearing bindings",
            ));
        }
        self.native_mut(Operation::Bind)?.clear_bindings();
        Ok(())
    }

    /// Releases the native statement. Idempotent.
    pub fn finalize(&mut self) {
        if let Some(native) = self.native.take() {
            trace!(sql = %self.sql, "finalizing statement");
            native.finalize();
        }
        self.state = CursorState::Finalized;
    }

    // ─── Metadata ──────────────────────────────────────────────────────

    pub fn column_count(&self) -> RowcastResult<usize> {
        Ok(self.native(Operation::Read)?.column_count())
    }

    pub fn column_name(&self, index: usize) -> RowcastResult<String> {
        Ok(self.native(Operation::Read)?.column_name(index))
    }

    pub fn column_table_name(&self, index: usize) -> RowcastResult<String> {
        Ok(self.native(Operation::Read)?.column_table_name(index))
    }

    /// Column name before any `AS` alias.
    pub fn original_column_name(&self, index: usize) -> RowcastResult<String> {
        Ok(self.native(Operation::Read)?.column_origin_name(index))
    }

    /// Storage class of the current row's value at `index`.
    ///
    /// `Null` when there is no current row or the index is out of range.
    pub fn column_type(&self, index: usize) -> RowcastResult<ColumnType> {
        let native = self.native(Operation::Read)?;
        if self.state != CursorState::HasRow || index >= native.column_count() {
            return Ok(ColumnType::Null);
        }
        Ok(column_type_from_code(native.column_type_code(index)))
    }

    /// Index of the first column whose name equals `name` exactly.
    pub fn index_by_name(&self, name: &str) -> RowcastResult<Option<usize>> {
        let native = self.native(Operation::Read)?;
        Ok((0..native.column_count()).find(|&i| native.column_name(i) == name))
    }

    pub fn column_type_by_name(&self, name: &str) -> RowcastResult<ColumnType> {
        match self.index_by_name(name)? {
            Some(index) => self.column_type(index),
            None => Ok(ColumnType::Null),
        }
    }

    pub fn columns(&self) -> RowcastResult<Vec<ColumnDescriptor>> {
        let native = self.native(Operation::Read)?;
        (0..native.column_count())
            .map(|index| {
                Ok(ColumnDescriptor {
                    index,
                    name: native.column_name(index),
                    table_name: native.column_table_name(index),
                    origin_name: native.column_origin_name(index),
                    column_type: self.column_type(index)?,
                })
            })
            .collect()
    }

    pub fn is_readonly(&self) -> RowcastResult<bool> {
        Ok(self.native(Operation::Read)?.is_readonly())
    }

    /// Rowid of the most recent successful insert on the owning connection.
    pub fn last_inserted_row_id(&self) -> RowcastResult<i64> {
        Ok(self.native(Operation::Read)?.last_insert_rowid())
    }

    /// Rows changed by the most recent write on the owning connection.
    pub fn changes(&self) -> RowcastResult<i64> {
        Ok(self.native(Operation::Read)?.changes())
    }

    // ─── Row access ────────────────────────────────────────────────────

    /// Current row's value at `index`, materialized by its storage class.
    /// Out-of-range indexes read as NULL.
    pub fn value(&self, index: usize) -> RowcastResult<Value> {
        let native = self.row_native(Operation::Read)?;
        if index >= native.column_count() {
            return Ok(Value::Null);
        }
        let value = match column_type_from_code(native.column_type_code(index)) {
            ColumnType::Integer32 | ColumnType::Integer64 => {
                Value::Integer64(native.get_integer(index))
            }
            ColumnType::Float => Value::Float(native.get_double(index)),
            ColumnType::Text => Value::Text(native.get_text(index)),
            ColumnType::Blob => Value::Blob(native.get_blob(index)),
            ColumnType::Null => Value::Null,
        };
        Ok(value)
    }

    /// Value of the first column named `name`; `None` when no column matches.
    pub fn value_by_name(&self, name: &str) -> RowcastResult<Option<Value>> {
        self.row_native(Operation::Read)?;
        match self.index_by_name(name)? {
            Some(index) => self.value(index).map(Some),
            None => Ok(None),
        }
    }

    /// Typed read. `None` for NULL, or when the value cannot represent `T`.
    pub fn get<T: ColumnDecodable>(&self, index: usize) -> RowcastResult<Option<T>> {
        let value = self.value(index)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(T::from_value(&value))
    }

    pub fn get_by_name<T: ColumnDecodable>(&self, name: &str) -> RowcastResult<Option<T>> {
        match self.value_by_name(name)? {
            Some(value) if !value.is_null() => Ok(T::from_value(&value)),
            _ => Ok(None),
        }
    }

    /// Every column of the current row.
    pub fn one_row_value(&self) -> RowcastResult<OneRow> {
        let count = self.row_native(Operation::Read)?.column_count();
        (0..count).map(|i| self.value(i)).collect()
    }

    // ─── Draining helpers. Each finalizes the statement on every exit. ───

    /// Steps until `Done`, calling `f` on each row, then finalizes.
    pub fn for_each_row<F>(&mut self, mut f: F) -> RowcastResult<()>
    where
        F: FnMut(&Self) -> RowcastResult<()>,
    {
        let outcome = self.drain(&mut f);
        self.finalize();
        outcome
    }

    /// Steps until `Done`, mapping each row, then finalizes.
    pub fn collect_rows<T, F>(&mut self, mut f: F) -> RowcastResult<Vec<T>>
    where
        F: FnMut(&Self) -> RowcastResult<T>,
    {
        let mut out = Vec::new();
        let outcome = self.drain(&mut |stmt: &Self| -> RowcastResult<()> {
            out.push(f(stmt)?);
            Ok(())
        });
        self.finalize();
        outcome.map(|()| out)
    }

    fn drain(&mut self, f: &mut dyn FnMut(&Self) -> RowcastResult<()>) -> RowcastResult<()> {
        while self.step()? == StepResult::Row {
            f(self)?;
        }
        Ok(())
    }

    /// The column at `index` across all remaining rows.
    pub fn one_column_value(&mut self, index: usize) -> RowcastResult<OneColumn> {
        self.collect_rows(|stmt| stmt.value(index))
    }

    /// All remaining rows.
    pub fn multi_rows_value(&mut self) -> RowcastResult<MultiRows> {
        let rows = self.collect_rows(Self::one_row_value)?;
        debug!(sql = %self.sql, rows = rows.len(), "read rows");
        Ok(rows)
    }

    /// The first remaining row, or `None` when the statement yields no rows.
    pub fn first_row_value(&mut self) -> RowcastResult<Option<OneRow>> {
        let outcome = match self.step() {
            Ok(StepResult::Row) => self.one_row_value().map(Some),
            Ok(StepResult::Done) => Ok(None),
            Err(e) => Err(e),
        };
        self.finalize();
        outcome
    }

    /// Runs the statement to completion, discarding rows.
    pub fn execute(&mut self) -> RowcastResult<()> {
        self.for_each_row(|_| Ok(()))
    }
}

impl<S: NativeStatement> Drop for HandleStatement<S> {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl<S: NativeStatement> std::fmt::Debug for HandleStatement<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleStatement")
            .field("sql", &self.sql)
            .field("state", &self.state)
            .finish()
    }
}
