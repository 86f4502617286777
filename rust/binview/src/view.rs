//! The value-or-view returned by field and element access, and the byte-copy
//! contract used by `set_view`.

use binview_common::{Result, error::Error};

use crate::{
    array_view::ArrayView, element::ElementType, record_type::RecordType,
    record_view::RecordView, text_view::TextView, value::Value,
};

/// Result of zero-copy access to a field or sequence element.
///
/// Numbers (and extension values) are decoded directly; text, sequences and
/// nested records come back as views sharing the parent's buffer.
#[derive(Debug)]
pub enum View<B> {
    Scalar(Value),
    Text(TextView<B>),
    Array(ArrayView<B>),
    Record(RecordView<B>),
}

impl<B: AsRef<[u8]>> View<B> {
    /// Materializes the view into a plain value.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            View::Scalar(value) => Ok(value.clone()),
            View::Text(text) => Ok(Value::Text(text.to_string())),
            View::Array(array) => array.to_value(),
            View::Record(record) => record.to_value(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            View::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextView<B>> {
        match self {
            View::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView<B>> {
        match self {
            View::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordView<B>> {
        match self {
            View::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            View::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<TextView<B>> {
        match self {
            View::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<ArrayView<B>> {
        match self {
            View::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<RecordView<B>> {
        match self {
            View::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The backing buffer of a text, array or record view.
    pub fn buffer(&self) -> Option<&[u8]> {
        match self {
            View::Scalar(_) => None,
            View::Text(text) => Some(text.buffer()),
            View::Array(array) => Some(array.buffer()),
            View::Record(record) => Some(record.buffer()),
        }
    }
}

/// What a view's bytes hold, used to validate `set_view` targets.
#[derive(Debug, Clone, Copy)]
pub enum ViewShape<'a> {
    /// A decoded value with no byte window of its own.
    Scalar,
    Text { capacity: usize },
    Array { element: &'a ElementType, len: usize },
    Record(&'a RecordType),
}

/// A view whose raw bytes can be copied into a compatible field or element slot.
pub trait ByteView {
    /// The bytes of the view's window.
    fn view_bytes(&self) -> &[u8];

    fn view_shape(&self) -> ViewShape<'_>;
}

impl<B: AsRef<[u8]>> ByteView for TextView<B> {
    fn view_bytes(&self) -> &[u8] {
        self.as_bytes()
    }

    fn view_shape(&self) -> ViewShape<'_> {
        ViewShape::Text {
            capacity: self.len(),
        }
    }
}

impl<B: AsRef<[u8]>> ByteView for ArrayView<B> {
    fn view_bytes(&self) -> &[u8] {
        self.as_bytes()
    }

    fn view_shape(&self) -> ViewShape<'_> {
        ViewShape::Array {
            element: self.array_type().element(),
            len: self.len(),
        }
    }
}

impl<B: AsRef<[u8]>> ByteView for RecordView<B> {
    fn view_bytes(&self) -> &[u8] {
        self.as_bytes()
    }

    fn view_shape(&self) -> ViewShape<'_> {
        ViewShape::Record(self.record_type())
    }
}

impl<B: AsRef<[u8]>> ByteView for View<B> {
    fn view_bytes(&self) -> &[u8] {
        match self {
            View::Scalar(_) => &[],
            View::Text(text) => text.view_bytes(),
            View::Array(array) => array.view_bytes(),
            View::Record(record) => record.view_bytes(),
        }
    }

    fn view_shape(&self) -> ViewShape<'_> {
        match self {
            View::Scalar(_) => ViewShape::Scalar,
            View::Text(text) => text.view_shape(),
            View::Array(array) => array.view_shape(),
            View::Record(record) => record.view_shape(),
        }
    }
}

/// Checks that `view` can be byte-copied into a slot holding `size` elements of
/// `element` (`None` for a scalar slot) and returns the bytes to copy.
pub(crate) fn checked_source<'v, V: ByteView + ?Sized>(
    view: &'v V,
    element: &ElementType,
    size: Option<usize>,
    field: &str,
) -> Result<&'v [u8]> {
    let bytes = view.view_bytes();
    let expected = element.byte_len() * size.unwrap_or(1);
    if bytes.len() != expected {
        return Err(Error::view_mismatch(
            field,
            format!("expected {expected} bytes, got {}", bytes.len()),
        ));
    }

    let compatible = match (size, view.view_shape()) {
        (_, ViewShape::Scalar) => false,
        (Some(_), ViewShape::Array { element: source, .. }) => element.is_compatible(source),
        (Some(_), _) => false,
        (None, shape) => element.accepts_shape(shape),
    };
    if !compatible {
        return Err(Error::view_mismatch(
            field,
            format!("{:?} cannot be copied into {:?}", view.view_shape(), element.kind()),
        ));
    }
    Ok(bytes)
}
