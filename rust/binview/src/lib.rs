//! Zero-copy, fixed-layout binary views over raw byte buffers.
//!
//! A record type is declared from an ordered schema of named fields. On first use
//! the schema is compiled into a [`layout::Layout`]: every field gets a byte offset,
//! an element length and an interpreter, and the record gets a fixed byte length.
//! Views then read and write individual fields directly against buffer bytes.
//!
//! # Main Components
//!
//! - [`registry::TypeRegistry`]: maps type names to field configurators. Built-in
//!   entries cover 8/16/32/64-bit integers, 32/64-bit floats and fixed-capacity text;
//!   record types can add or override entries for their own extension types.
//! - [`record_type::RecordType`]: a named schema plus its registry, extension
//!   accessors and configuration. Compiles its layout lazily, exactly once.
//! - [`record_view::RecordView`]: a window over one record's bytes with per-field
//!   `get`/`get_value`/`set`/`set_view` and whole-record conversion to plain values.
//! - [`array_view::ArrayView`]: a window over a run of equal-size elements
//!   (primitives, text, records or extension values).
//! - [`text_view::TextView`]: a fixed-capacity, zero-padded text slot.
//! - [`value::Value`]: the plain, allocation-owning value model used for conversion.
//!
//! # Borrowing
//!
//! Views are generic over their backing store `B: AsRef<[u8]>`. Nested views
//! returned by `get` borrow the parent's buffer (`&[u8]`), views returned by
//! `get_mut` borrow it mutably (`&mut [u8]`); they never copy and cannot outlive
//! the buffer. All views report the whole backing buffer and an absolute offset,
//! so a nested view shares `buffer()` with its parent.

pub mod accessors;
pub mod array_view;
pub mod config;
pub mod element;
pub mod layout;
pub mod record_type;
pub mod record_view;
pub mod registry;
pub mod schema;
pub mod text_view;
pub mod value;
pub mod view;

#[cfg(test)]
mod tests;

pub use accessors::{Accessors, Getter, Setter};
pub use array_view::{ArrayIter, ArrayType, ArrayView};
pub use binview_bytes::{ByteBuffer, Endian};
pub use binview_common::{Result, error::Error, error::ErrorKind};
pub use config::{LayoutConfig, TextEncoding};
pub use element::{ElementKind, ElementType};
pub use layout::{FieldLayout, Layout};
pub use record_type::{RecordType, RecordTypeBuilder};
pub use record_view::RecordView;
pub use registry::{FieldConfig, Primitive, TypeRegistry, ViewKind};
pub use schema::{FieldSpec, FieldType, Schema};
pub use text_view::TextView;
pub use value::{Object, Value};
pub use view::{ByteView, View, ViewShape};
