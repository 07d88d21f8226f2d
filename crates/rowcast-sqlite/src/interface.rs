//! One-call getters and object writes built on the statement cursor.

use rowcast_core::{MultiRows, OneColumn, OneRow, Operation, RowcastError, RowcastResult, Value};
use tracing::debug;

use crate::handle::{Handle, Statement};
use crate::orm::{ExtractionMap, TableDecodable, TableEncodable, TableRecord};
use crate::statement::StepResult;

impl Handle {
    fn prepare_bound(&self, sql: &str, params: &[Value]) -> RowcastResult<Statement<'_>> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_all(params)?;
        Ok(stmt)
    }

    /// First column of the first row; `Null` when there are no rows.
    pub fn get_value(&self, sql: &str, params: &[Value]) -> RowcastResult<Value> {
        let row = self.prepare_bound(sql, params)?.first_row_value()?;
        Ok(row.and_then(|r| r.into_iter().next()).unwrap_or_default())
    }

    /// First row; empty when there are no rows.
    pub fn get_one_row(&self, sql: &str, params: &[Value]) -> RowcastResult<OneRow> {
        Ok(self
            .prepare_bound(sql, params)?
            .first_row_value()?
            .unwrap_or_default())
    }

    /// First column of every row.
    pub fn get_one_column(&self, sql: &str, params: &[Value]) -> RowcastResult<OneColumn> {
        self.prepare_bound(sql, params)?.one_column_value(0)
    }

    pub fn get_rows(&self, sql: &str, params: &[Value]) -> RowcastResult<MultiRows> {
        self.prepare_bound(sql, params)?.multi_rows_value()
    }

    /// First matching object. `fields` defaults to every field of `T`;
    /// `condition` is the expression after `WHERE`, with `params` bound to it.
    /// Only the first row is stepped, so the condition may carry its own
    /// `ORDER BY`, `LIMIT` or `OFFSET`.
    pub fn get_object<T: TableDecodable>(
        &self,
        table: &str,
        fields: Option<&[&str]>,
        condition: Option<&str>,
        params: &[Value],
    ) -> RowcastResult<Option<T>> {
        let names = selected_fields::<T>(fields)?;
        let map = ExtractionMap::positional::<T>(Some(names.as_slice()))?;
        let sql = select_sql(table, &names, condition)?;
        let mut stmt = self.prepare_bound(&sql, params)?;
        let outcome = match stmt.step() {
            Ok(StepResult::Row) => stmt.extract_object(&map).map(Some),
            Ok(StepResult::Done) => Ok(None),
            Err(e) => Err(e),
        };
        stmt.finalize();
        outcome
    }

    /// Every matching object, in result order.
    pub fn get_objects<T: TableDecodable>(
        &self,
        table: &str,
        fields: Option<&[&str]>,
        condition: Option<&str>,
        params: &[Value],
    ) -> RowcastResult<Vec<T>> {
        let names = selected_fields::<T>(fields)?;
        let map = ExtractionMap::positional::<T>(Some(names.as_slice()))?;
        let sql = select_sql(table, &names, condition)?;
        let objects = self
            .prepare_bound(&sql, params)?
            .extract_all_objects(&map)?;
        debug!(table, count = objects.len(), "read objects");
        Ok(objects)
    }

    /// Inserts every object with a single prepared INSERT. Runs inside the
    /// open transaction if there is one, otherwise in a new one.
    /// `fields` defaults to every field of `T`.
    pub fn insert_objects<T: TableEncodable>(
        &self,
        table: &str,
        objects: &[T],
        fields: Option<&[&str]>,
    ) -> RowcastResult<()> {
        self.write_objects(InsertMode::Insert, table, objects, fields)
    }

    /// As [`Handle::insert_objects`], replacing rows that hit a uniqueness
    /// constraint.
    pub fn insert_or_replace_objects<T: TableEncodable>(
        &self,
        table: &str,
        objects: &[T],
        fields: Option<&[&str]>,
    ) -> RowcastResult<()> {
        self.write_objects(InsertMode::Replace, table, objects, fields)
    }

    fn write_objects<T: TableEncodable>(
        &self,
        mode: InsertMode,
        table: &str,
        objects: &[T],
        fields: Option<&[&str]>,
    ) -> RowcastResult<()> {
        let names = selected_fields::<T>(fields)?;
        let sql = insert_sql(mode, table, &names)?;
        if objects.is_empty() {
            return Ok(());
        }
        self.run_embedded_transaction(|handle| {
            let mut stmt = handle.prepare(&sql)?;
            for object in objects {
                stmt.bind_object(object, &names)?;
                stmt.step()?;
                stmt.reset()?;
            }
            stmt.finalize();
            Ok(())
        })?;
        debug!(table, count = objects.len(), "inserted objects");
        Ok(())
    }

    /// Sets the listed columns of matching rows from the fields of `object`.
    /// Fields bind at `?1..=?N`; `condition` placeholders follow, so write
    /// them as `?` or number them from `N + 1`. A missing condition updates
    /// every row.
    pub fn update_object<T: TableEncodable>(
        &self,
        table: &str,
        object: &T,
        fields: Option<&[&str]>,
        condition: Option<&str>,
        params: &[Value],
    ) -> RowcastResult<()> {
        let names = selected_fields::<T>(fields)?;
        let sql = update_sql(table, &names, condition)?;
        let mut stmt = self.prepare(&sql)?;
        stmt.bind_object(object, &names)?;
        for (offset, value) in params.iter().enumerate() {
            stmt.bind_value(value, names.len() + offset + 1)?;
        }
        stmt.execute()?;
        debug!(table, changes = self.changes(), "updated rows");
        Ok(())
    }

    /// Deletes matching rows; a missing condition empties the table.
    pub fn delete(
        &self,
        table: &str,
        condition: Option<&str>,
        params: &[Value],
    ) -> RowcastResult<()> {
        let sql = delete_sql(table, condition)?;
        self.prepare_bound(&sql, params)?.execute()?;
        debug!(table, changes = self.changes(), "deleted rows");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum InsertMode {
    Insert,
    Replace,
}

impl InsertMode {
    fn verb(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Replace => "INSERT OR REPLACE",
        }
    }
}

fn selected_fields<T: TableRecord>(fields: Option<&[&str]>) -> RowcastResult<Vec<&'static str>> {
    let all = T::fields();
    let names: Vec<&'static str> = match fields {
        None => all.iter().map(|f| f.name).collect(),
        Some(list) => list
            .iter()
            .map(|name| {
                all.iter()
                    .find(|f| f.name == *name)
                    .map(|f| f.name)
                    .ok_or_else(|| {
                        RowcastError::misuse(
                            Operation::Prepare,
                            format!("`{name}` is not a field of the record"),
                        )
                    })
            })
            .collect::<RowcastResult<_>>()?,
    };
    if names.is_empty() {
        return Err(RowcastError::misuse(
            Operation::Prepare,
            "field list is empty",
        ));
    }
    Ok(names)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn check_table(table: &str) -> RowcastResult<()> {
    if table.trim().is_empty() {
        return Err(RowcastError::misuse(Operation::Prepare, "table name is empty"));
    }
    Ok(())
}

fn push_condition(sql: &mut String, condition: Option<&str>) {
    if let Some(condition) = condition.filter(|c| !c.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
}

fn select_sql(table: &str, fields: &[&str], condition: Option<&str>) -> RowcastResult<String> {
    check_table(table)?;
    let columns: Vec<String> = fields.iter().map(|f| quote_identifier(f)).collect();
    let mut sql = format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote_identifier(table)
    );
    push_condition(&mut sql, condition);
    Ok(sql)
}

fn insert_sql(mode: InsertMode, table: &str, fields: &[&str]) -> RowcastResult<String> {
    check_table(table)?;
    let columns: Vec<String> = fields.iter().map(|f| quote_identifier(f)).collect();
    let params: Vec<String> = (1..=fields.len()).map(|i| format!("?{i}")).collect();
    Ok(format!(
        "{} INTO {}({}) VALUES({})",
        mode.verb(),
        quote_identifier(table),
        columns.join(", "),
        params.join(", ")
    ))
}

fn update_sql(table: &str, fields: &[&str], condition: Option<&str>) -> RowcastResult<String> {
    check_table(table)?;
    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} = ?{}", quote_identifier(f), i + 1))
        .collect();
    let mut sql = format!(
        "UPDATE {} SET {}",
        quote_identifier(table),
        assignments.join(", ")
    );
    push_condition(&mut sql, condition);
    Ok(sql)
}

fn delete_sql(table: &str, condition: Option<&str>) -> RowcastResult<String> {
    check_table(table)?;
    let mut sql = format!("DELETE FROM {}", quote_identifier(table));
    push_condition(&mut sql, condition);
    Ok(sql)
}
