//! Field-to-column maps, built once per statement/record pair.

use rowcast_core::field::find_field;
use rowcast_core::{ColumnType, Operation, RowcastError, RowcastResult};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::TableRecord;
use crate::native::NativeStatement;
use crate::statement::HandleStatement;

/// One mapped field: read `field` from result column `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: &'static str,
    pub column_type: ColumnType,
    pub index: usize,
}

/// Ordered field bindings of a record type against one statement's columns.
#[derive(Debug, Clone, Default)]
pub struct ExtractionMap {
    bindings: SmallVec<[FieldBinding; 8]>,
    by_field: FxHashMap<&'static str, usize>,
}

impl ExtractionMap {
    /// Maps the i-th listed field to column i. `None` selects every field of `T`
    /// in declaration order.
    pub fn positional<T: TableRecord>(fields: Option<&[&str]>) -> RowcastResult<Self> {
        let all = T::fields();
        let mut map = Self::default();
        match fields {
            None => {
                for (index, field) in all.iter().enumerate() {
                    map.push(field.name, field.column_type, index)?;
                }
            }
            Some(names) => {
                for (index, name) in names.iter().enumerate() {
                    let field = find_field(all, name).ok_or_else(|| {
                        RowcastError::misuse(
                            Operation::Decode,
                            format!("`{name}` is not a field of the record"),
                        )
                    })?;
                    map.push(field.name, field.column_type, index)?;
                }
            }
        }
        map.require_fields()?;
        Ok(map)
    }

    /// Maps each field of `T` to the statement column with the same name.
    /// Fields without a matching column stay unmapped.
    pub fn by_column_name<T: TableRecord, S: NativeStatement>(
        statement: &HandleStatement<S>,
    ) -> RowcastResult<Self> {
        let mut map = Self::default();
        for field in T::fields() {
            if let Some(index) = statement.index_by_name(field.name)? {
                map.push(field.name, field.column_type, index)?;
            }
        }
        if map.is_empty() {
            return Err(RowcastError::misuse(
                Operation::Decode,
                "no result column matches a field of the record",
            ));
        }
        Ok(map)
    }

    fn push(
        &mut self,
        field: &'static str,
        column_type: ColumnType,
        index: usize,
    ) -> RowcastResult<()> {
        if self.by_field.insert(field, self.bindings.len()).is_some() {
            return Err(RowcastError::misuse(
                Operation::Decode,
                format!("field `{field}` is selected twice"),
            ));
        }
        self.bindings.push(FieldBinding {
            field,
            column_type,
            index,
        });
        Ok(())
    }

    fn require_fields(&self) -> RowcastResult<()> {
        if self.bindings.is_empty() {
            return Err(RowcastError::misuse(
                Operation::Decode,
                "extraction needs at least one field",
            ));
        }
        Ok(())
    }

    /// Fails when a binding points past the statement's last column.
    pub fn check_columns(&self, column_count: usize) -> RowcastResult<()> {
        match self.bindings.iter().find(|b| b.index >= column_count) {
            Some(b) => Err(RowcastError::misuse(
                Operation::Decode,
                format!(
                    "field `{}` maps to column {} but the statement has {column_count}",
                    b.field, b.index
                ),
            )),
            None => Ok(()),
        }
    }

    pub fn binding(&self, field: &str) -> Option<&FieldBinding> {
        self.by_field.get(field).map(|&i| &self.bindings[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
