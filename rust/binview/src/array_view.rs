//! Fixed-length arrays of equal-size elements.
//!
//! An [`ArrayType`] describes the element interpreter; an [`ArrayView`] is a window
//! of `byte_len` bytes holding `byte_len / element_len` elements. The element count
//! is always derived from the window, never stored.

use binview_bytes::{ByteBuffer, Endian};
use binview_common::{Result, error::Error, try_or_ret_some_err, verify_index};
use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::{
    config::TextEncoding,
    element::{self, ElementType},
    record_type::RecordType,
    record_view::check_window,
    registry::Primitive,
    value::Value,
    view::{self, ByteView, View},
};

/// The element type of an array, used to size, allocate and wrap array views.
#[derive(Debug, Clone)]
pub struct ArrayType {
    element: ElementType,
}

impl ArrayType {
    pub fn new(element: ElementType) -> ArrayType {
        ArrayType { element }
    }

    /// Big-endian array of the primitive named `type_name` (`"int16"`, `"float64"`, ...).
    pub fn primitive(type_name: &str) -> Result<ArrayType> {
        Self::primitive_with(type_name, Endian::Big)
    }

    pub fn primitive_with(type_name: &str, endian: Endian) -> Result<ArrayType> {
        let primitive =
            Primitive::from_name(type_name).ok_or_else(|| Error::invalid_type(type_name))?;
        Ok(Self::new(ElementType::primitive(primitive, endian)))
    }

    /// Array of UTF-8 text slots of `capacity` bytes each.
    pub fn text(capacity: usize) -> ArrayType {
        Self::text_with(capacity, TextEncoding::default())
    }

    pub fn text_with(capacity: usize, encoding: TextEncoding) -> ArrayType {
        Self::new(ElementType::text(capacity, encoding))
    }

    /// Array of records of `ty`, compiling the record type if needed.
    pub fn records(ty: &RecordType) -> Result<ArrayType> {
        Ok(Self::new(ElementType::record(ty)?))
    }

    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn element_len(&self) -> usize {
        self.element.byte_len()
    }

    /// Byte length of an array of `size` elements.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidArgument` if the length overflows `usize`.
    pub fn byte_len(&self, size: usize) -> Result<usize> {
        size.checked_mul(self.element.byte_len()).ok_or_else(|| {
            Error::invalid_arg(
                "size",
                format!(
                    "{size} elements of {} bytes overflow the address space",
                    self.element.byte_len()
                ),
            )
        })
    }

    /// Allocates a zeroed array of `size` elements.
    pub fn of(&self, size: usize) -> Result<ArrayView<ByteBuffer>> {
        self.check_element_len()?;
        let byte_len = self.byte_len(size)?;
        Ok(ArrayView::from_parts(
            self.clone(),
            ByteBuffer::zeroed(byte_len),
            0,
            byte_len,
        ))
    }

    /// Allocates an array of exactly `values.len()` elements and writes them.
    pub fn from_values(&self, values: &[Value]) -> Result<ArrayView<ByteBuffer>> {
        let mut array = self.of(values.len())?;
        array.fill(values)?;
        Ok(array)
    }

    /// Wraps `byte_len` bytes of `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails if the window does not fit into the buffer or if `byte_len` is not a
    /// whole number of elements.
    pub fn view<B: AsRef<[u8]>>(&self, buf: B, offset: usize, byte_len: usize) -> Result<ArrayView<B>> {
        self.check_element_len()?;
        let element_len = self.element_len();
        if byte_len % element_len != 0 {
            return Err(Error::invalid_length(byte_len, element_len));
        }
        let available = buf.as_ref().len();
        if offset.checked_add(byte_len).is_none_or(|end| end > available) {
            return Err(Error::out_of_bounds(offset, byte_len, available));
        }
        Ok(ArrayView::from_parts(self.clone(), buf, offset, byte_len))
    }

    fn check_element_len(&self) -> Result<()> {
        if self.element_len() == 0 {
            return Err(Error::invalid_arg(
                "element_len",
                "array elements must be at least one byte",
            ));
        }
        Ok(())
    }
}

/// A window of equal-size elements over the buffer `B`.
#[derive(Debug, Clone)]
pub struct ArrayView<B> {
    ty: ArrayType,
    buf: B,
    offset: usize,
    byte_len: usize,
}

impl<B: AsRef<[u8]>> ArrayView<B> {
    pub(crate) fn from_parts(ty: ArrayType, buf: B, offset: usize, byte_len: usize) -> ArrayView<B> {
        ArrayView {
            ty,
            buf,
            offset,
            byte_len,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.byte_len
            .checked_div(self.ty.element_len())
            .unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn array_type(&self) -> &ArrayType {
        &self.ty
    }

    /// The whole backing buffer, not just this array's window.
    pub fn buffer(&self) -> &[u8] {
        self.buf.as_ref()
    }

    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[self.offset..self.offset + self.byte_len]
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    fn element_offset(&self, index: usize) -> usize {
        self.offset + index * self.ty.element_len()
    }

    /// Zero-copy access to element `index`.
    ///
    /// Primitive and extension elements are decoded; text and record elements
    /// are returned as views borrowing this array's buffer.
    pub fn get(&self, index: usize) -> Result<View<&[u8]>> {
        verify_index!(index, self.len());
        self.ty
            .element
            .view(self.buf.as_ref(), self.element_offset(index))
    }

    /// Materializes element `index` into a plain value.
    pub fn get_value(&self, index: usize) -> Result<Value> {
        verify_index!(index, self.len());
        self.ty
            .element
            .read(self.buf.as_ref(), self.element_offset(index))
    }

    /// Materializes every element, in order.
    pub fn to_value(&self) -> Result<Value> {
        self.ty
            .element
            .read_run(self.buf.as_ref(), self.offset, self.len())
    }

    /// Iterates over zero-copy element views. Every call starts a fresh traversal.
    pub fn iter(&self) -> ArrayIter<'_, B> {
        ArrayIter {
            array: self,
            index: 0,
            end: self.len(),
        }
    }

    /// Iterates over materialized element values.
    pub fn values(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        (0..self.len()).map(move |index| self.get_value(index))
    }

    /// Decodes a primitive at `position`, relative to the array start.
    pub fn read(&self, primitive: Primitive, position: usize, endian: Endian) -> Result<Value> {
        check_window(position, primitive, self.byte_len)?;
        Ok(primitive.read(self.buf.as_ref(), self.offset + position, endian))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ArrayView<B> {
    /// Zero-copy mutable access to element `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<View<&mut [u8]>> {
        verify_index!(index, self.len());
        let offset = self.element_offset(index);
        self.ty.element.view(self.buf.as_mut(), offset)
    }

    /// Writes a plain value into element `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<&mut Self> {
        verify_index!(index, self.len());
        let value = value.into();
        let field = format!("[{index}]");
        self.ty.element.check(Some(&value), &field)?;
        let element = &self.ty.element;
        let start = self.element_offset(index);
        element::write_staged(
            self.buf.as_mut(),
            start..start + element.byte_len(),
            element.has_extension()?,
            |buf, offset| element.write(buf, offset, Some(&value), &field),
        )?;
        Ok(self)
    }

    /// Copies the raw bytes of a compatible view into element `index`.
    pub fn set_view<V: ByteView + ?Sized>(&mut self, index: usize, source: &V) -> Result<&mut Self> {
        verify_index!(index, self.len());
        let bytes = view::checked_source(source, &self.ty.element, None, &format!("[{index}]"))?;
        let start = self.element_offset(index);
        self.buf.as_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(self)
    }

    /// Zero-fills every element, then writes `values` left-to-right.
    ///
    /// Values beyond the array's length are ignored; elements without a value keep
    /// their default. The values are validated before any byte changes.
    pub fn fill(&mut self, values: &[Value]) -> Result<&mut Self> {
        let len = self.len();
        for (index, value) in values.iter().take(len).enumerate() {
            self.ty.element.check(Some(value), &format!("[{index}]"))?;
        }
        if values.len() < len {
            // Trailing slots are written with a missing value.
            self.ty.element.check(None, "[..]")?;
        }
        let element = &self.ty.element;
        let range = self.offset..self.offset + self.byte_len;
        element::write_staged(
            self.buf.as_mut(),
            range,
            element.has_extension()?,
            |buf, offset| element.write_run(buf, offset, len, values, "[..]"),
        )?;
        Ok(self)
    }

    /// Encodes a primitive at `position`, relative to the array start.
    pub fn write(
        &mut self,
        primitive: Primitive,
        position: usize,
        value: impl Into<Value>,
        endian: Endian,
    ) -> Result<()> {
        check_window(position, primitive, self.byte_len)?;
        let offset = self.offset + position;
        primitive.write(self.buf.as_mut(), offset, &value.into(), endian)
    }
}

/// Iterator over the element views of an [`ArrayView`].
pub struct ArrayIter<'a, B> {
    array: &'a ArrayView<B>,
    index: usize,
    end: usize,
}

impl<'a, B: AsRef<[u8]>> Iterator for ArrayIter<'a, B> {
    type Item = Result<View<&'a [u8]>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let view = try_or_ret_some_err!(self.array.get(index));
        Some(Ok(view))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl<B: AsRef<[u8]>> ExactSizeIterator for ArrayIter<'_, B> {}

impl<'a, B: AsRef<[u8]>> IntoIterator for &'a ArrayView<B> {
    type Item = Result<View<&'a [u8]>>;
    type IntoIter = ArrayIter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<B: AsRef<[u8]>> Serialize for ArrayView<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.values() {
            seq.serialize_element(&value.map_err(serde::ser::Error::custom)?)?;
        }
        seq.end()
    }
}
