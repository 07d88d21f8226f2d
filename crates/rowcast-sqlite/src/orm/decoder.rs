//! Row-to-record decoding.

use rowcast_core::{ColumnDecodable, ColumnType, Operation, RowcastError, RowcastResult};

use super::extraction::{ExtractionMap, FieldBinding};
use super::TableRecord;
use crate::native::NativeStatement;
use crate::statement::HandleStatement;

/// A record type rebuilt from one result row.
pub trait TableDecodable: TableRecord + Sized {
    fn decode<S: NativeStatement>(row: &RowDecoder<'_, S>) -> RowcastResult<Self>;
}

/// Field reader over the current row of a cursor.
pub struct RowDecoder<'a, S: NativeStatement> {
    statement: &'a HandleStatement<S>,
    map: &'a ExtractionMap,
}

impl<'a, S: NativeStatement> RowDecoder<'a, S> {
    pub fn new(statement: &'a HandleStatement<S>, map: &'a ExtractionMap) -> Self {
        Self { statement, map }
    }

    /// Reads a required field. Unmapped fields and NULL columns are errors.
    pub fn decode<T: ColumnDecodable>(&self, field: &str) -> RowcastResult<T> {
        let binding = self
            .map
            .binding(field)
            .ok_or_else(|| RowcastError::decode(field, "field is not selected"))?;
        self.read(binding)?
            .ok_or_else(|| RowcastError::decode(field, "column is NULL"))
    }

    /// Reads an optional field. Unmapped fields and NULL columns yield `None`.
    pub fn decode_if_present<T: ColumnDecodable>(&self, field: &str) -> RowcastResult<Option<T>> {
        match self.map.binding(field) {
            Some(binding) => self.read(binding),
            None => Ok(None),
        }
    }

    pub fn is_selected(&self, field: &str) -> bool {
        self.map.binding(field).is_some()
    }

    fn read<T: ColumnDecodable>(&self, binding: &FieldBinding) -> RowcastResult<Option<T>> {
        let found = self.statement.column_type(binding.index)?;
        if found == ColumnType::Null {
            return Ok(None);
        }
        if !binding.column_type.accepts(found) {
            return Err(RowcastError::decode(
                binding.field,
                format!("column holds {found}, field expects {}", binding.column_type),
            ));
        }
        let value = self.statement.value(binding.index)?;
        T::from_value(&value).map(Some).ok_or_else(|| {
            RowcastError::decode(binding.field, format!("{found} value is out of range"))
        })
    }
}

impl<S: NativeStatement> HandleStatement<S> {
    /// Decodes the current row into `T`. A map that points past the last
    /// column is a misuse error.
    pub fn extract_object<T: TableDecodable>(&self, map: &ExtractionMap) -> RowcastResult<T> {
        if self.is_finalized() {
            return Err(RowcastError::Finalized {
                operation: Operation::Decode,
            });
        }
        if self.state() != crate::statement::CursorState::HasRow {
            return Err(RowcastError::misuse(
                Operation::Decode,
                "no current row; step() must return Row first",
            ));
        }
        map.check_columns(self.column_count()?)?;
        T::decode(&RowDecoder::new(self, map))
    }

    /// Decodes every remaining row, then finalizes.
    pub fn extract_all_objects<T: TableDecodable>(
        &mut self,
        map: &ExtractionMap,
    ) -> RowcastResult<Vec<T>> {
        let checked = self
            .column_count()
            .and_then(|count| map.check_columns(count));
        if let Err(e) = checked {
            self.finalize();
            return Err(e);
        }
        self.collect_rows(|stmt| stmt.extract_object(map))
    }
}
