//! Typed record mapping on top of the statement cursor.
//!
//! Record types describe their fields once through [`TableRecord`], then opt
//! into reading ([`TableDecodable`]) and writing ([`TableEncodable`]).

pub mod decoder;
pub mod encoder;
pub mod extraction;

use rowcast_core::FieldDescriptor;

pub use decoder::{RowDecoder, TableDecodable};
pub use encoder::TableEncodable;
pub use extraction::{ExtractionMap, FieldBinding};

/// Field list of a record type, in declaration order.
pub trait TableRecord {
    fn fields() -> &'static [FieldDescriptor];
}
