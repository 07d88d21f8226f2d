//! Record field descriptors consumed by the extraction map.

use crate::codable::ColumnDecodable;
use crate::value::ColumnType;

/// One field of a record type: its name and the storage class it is archived as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }

    /// Descriptor whose storage class is taken from the field's host type.
    pub fn of<T: ColumnDecodable>(name: &'static str) -> Self {
        Self::new(name, T::column_type())
    }
}

/// Finds a descriptor by exact field name.
pub fn find_field<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|f| f.name == name)
}
