//! Record-to-parameter binding.

use rowcast_core::{Operation, RowcastError, RowcastResult, Value};

use super::TableRecord;
use crate::native::NativeStatement;
use crate::statement::HandleStatement;

/// A record type whose fields can be bound as statement parameters.
pub trait TableEncodable: TableRecord {
    /// Archived value of `field`, or `None` when the record has no such field.
    fn encode_field(&self, field: &str) -> Option<Value>;
}

fn encode<T: TableEncodable>(object: &T, field: &str) -> RowcastResult<Value> {
    object.encode_field(field).ok_or_else(|| {
        RowcastError::misuse(
            Operation::Encode,
            format!("`{field}` is not a field of the record"),
        )
    })
}

impl<S: NativeStatement> HandleStatement<S> {
    /// Binds the listed fields of `object` at parameters `1..=fields.len()`.
    pub fn bind_object<T: TableEncodable>(
        &mut self,
        object: &T,
        fields: &[&str],
    ) -> RowcastResult<()> {
        if fields.is_empty() {
            return Err(RowcastError::misuse(
                Operation::Encode,
                "binding needs at least one field",
            ));
        }
        for (offset, field) in fields.iter().enumerate() {
            let value = encode(object, field)?;
            self.bind_value(&value, offset + 1)?;
        }
        Ok(())
    }

    /// Binds each `(field, index)` pair of `object`.
    pub fn bind_object_at<T: TableEncodable>(
        &mut self,
        object: &T,
        bindings: &[(&str, usize)],
    ) -> RowcastResult<()> {
        if bindings.is_empty() {
            return Err(RowcastError::misuse(
                Operation::Encode,
                "binding needs at least one field",
            ));
        }
        for (field, index) in bindings {
            let value = encode(object, field)?;
            self.bind_value(&value, *index)?;
        }
        Ok(())
    }
}
