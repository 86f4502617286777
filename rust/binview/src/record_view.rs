//! Record views: typed windows over one record's bytes.

use std::sync::Arc;

use binview_bytes::{ByteBuffer, Endian};
use binview_common::{Result, error::Error};
use serde::{Serialize, Serializer};

use crate::{
    element,
    layout::{FieldLayout, Layout},
    record_type::RecordType,
    registry::Primitive,
    value::Value,
    view::{self, ByteView, View},
};

/// A window of one record over the buffer `B`.
///
/// The view holds the whole backing buffer and the absolute offset of the record,
/// so nested views obtained through [`RecordView::get`] report the same buffer.
#[derive(Debug, Clone)]
pub struct RecordView<B> {
    ty: RecordType,
    layout: Arc<Layout>,
    buf: B,
    offset: usize,
}

impl<B: AsRef<[u8]>> RecordView<B> {
    /// Wraps the record of type `ty` stored at `offset`, compiling the type if needed.
    pub fn new(ty: &RecordType, buf: B, offset: usize) -> Result<RecordView<B>> {
        let layout = ty.compile()?;
        let available = buf.as_ref().len();
        if offset
            .checked_add(layout.byte_len())
            .is_none_or(|end| end > available)
        {
            return Err(Error::out_of_bounds(offset, layout.byte_len(), available));
        }
        Ok(Self::from_parts(ty.clone(), layout, buf, offset))
    }

    pub(crate) fn from_parts(
        ty: RecordType,
        layout: Arc<Layout>,
        buf: B,
        offset: usize,
    ) -> RecordView<B> {
        RecordView {
            ty,
            layout,
            buf,
            offset,
        }
    }

    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The whole backing buffer, not just this record's window.
    pub fn buffer(&self) -> &[u8] {
        self.buf.as_ref()
    }

    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    pub fn byte_len(&self) -> usize {
        self.layout.byte_len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[self.offset..self.offset + self.layout.byte_len()]
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Copies the record's bytes into a freshly allocated buffer.
    pub fn detach(&self) -> RecordView<ByteBuffer> {
        RecordView::from_parts(
            self.ty.clone(),
            self.layout.clone(),
            ByteBuffer::copy_from_slice(self.as_bytes()),
            0,
        )
    }

    fn field_layout(&self, field: &str) -> Result<&FieldLayout> {
        self.layout
            .field(field)
            .ok_or_else(|| Error::unknown_field(self.ty.name(), field))
    }

    /// Zero-copy access to `field`.
    ///
    /// Numbers and extension values are decoded; text, sequence and nested record
    /// fields are returned as views borrowing this record's buffer.
    pub fn get(&self, field: &str) -> Result<View<&[u8]>> {
        self.field_layout(field)?
            .view(self.buf.as_ref(), self.offset)
    }

    /// Materializes `field` into a plain value.
    pub fn get_value(&self, field: &str) -> Result<Value> {
        self.field_layout(field)?
            .read(self.buf.as_ref(), self.offset)
    }

    /// Materializes the whole record into an object keyed in schema order.
    pub fn to_value(&self) -> Result<Value> {
        self.layout.read_record(self.buf.as_ref(), self.offset)
    }

    /// Decodes a primitive at `position`, relative to the record start.
    pub fn read(&self, primitive: Primitive, position: usize, endian: Endian) -> Result<Value> {
        check_window(position, primitive, self.byte_len())?;
        Ok(primitive.read(self.buf.as_ref(), self.offset + position, endian))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> RecordView<B> {
    /// Zero-copy mutable access to `field`.
    pub fn get_mut(&mut self, field: &str) -> Result<View<&mut [u8]>> {
        let layout = self.layout.clone();
        let field = layout
            .field(field)
            .ok_or_else(|| Error::unknown_field(self.ty.name(), field))?;
        field.view(self.buf.as_mut(), self.offset)
    }

    /// Writes a plain value into `field`.
    ///
    /// Sequences are zero-filled and then written left-to-right, discarding
    /// values beyond the declared size. Nested records are default-filled: the
    /// properties missing from `value` are reset rather than kept. The value is
    /// validated before any byte changes.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into();
        let layout = self.layout.clone();
        let field = layout
            .field(field)
            .ok_or_else(|| Error::unknown_field(self.ty.name(), field))?;
        field.check(Some(&value))?;
        let staged = field.element().has_extension()?;
        element::write_staged(
            self.buf.as_mut(),
            field.range(self.offset),
            staged,
            |buf, offset| field.write_at(buf, offset, Some(&value)),
        )?;
        Ok(self)
    }

    /// Copies the raw bytes of a compatible view into `field`.
    ///
    /// Text views fit text fields, record views fit nested fields of the same
    /// record type and array views fit sequence fields of the same element type.
    /// The byte lengths must match exactly.
    pub fn set_view<V: ByteView + ?Sized>(&mut self, field: &str, source: &V) -> Result<&mut Self> {
        let layout = self.layout.clone();
        let field = layout
            .field(field)
            .ok_or_else(|| Error::unknown_field(self.ty.name(), field))?;
        let bytes = view::checked_source(source, field.element(), field.size(), field.name())?;
        self.buf.as_mut()[field.range(self.offset)].copy_from_slice(bytes);
        Ok(self)
    }

    /// Writes every field from the object `value`; absent properties take
    /// zero/empty defaults.
    pub fn fill(&mut self, value: &Value) -> Result<&mut Self> {
        self.layout.check_record(Some(value), self.ty.name())?;
        let layout = self.layout.clone();
        let range = self.offset..self.offset + layout.byte_len();
        element::write_staged(
            self.buf.as_mut(),
            range,
            layout.has_extension(),
            |buf, offset| layout.write_record(buf, offset, Some(value)),
        )?;
        Ok(self)
    }

    /// Zeroes the record's bytes.
    pub fn clear(&mut self) {
        let range = self.offset..self.offset + self.layout.byte_len();
        self.buf.as_mut()[range].fill(0);
    }

    /// Encodes a primitive at `position`, relative to the record start.
    pub fn write(
        &mut self,
        primitive: Primitive,
        position: usize,
        value: impl Into<Value>,
        endian: Endian,
    ) -> Result<()> {
        check_window(position, primitive, self.byte_len())?;
        let offset = self.offset + position;
        primitive.write(self.buf.as_mut(), offset, &value.into(), endian)
    }
}

impl<B: AsRef<[u8]>> Serialize for RecordView<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Checks that a primitive at `position` lies within a window of `window` bytes.
pub(crate) fn check_window(position: usize, primitive: Primitive, window: usize) -> Result<()> {
    let len = primitive.byte_len();
    if position.checked_add(len).is_none_or(|end| end > window) {
        return Err(Error::out_of_bounds(position, len, window));
    }
    Ok(())
}
