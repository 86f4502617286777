//! Element interpreters: how one fixed-size slot of bytes is viewed, decoded,
//! validated and encoded.
//!
//! Record fields and sequence elements share this logic. A scalar field is one
//! slot; a sequence field (or an array view) is a run of equal-size slots.

use std::{ops::Range, sync::Arc};

use binview_bytes::Endian;
use binview_common::{Result, error::Error};

use crate::{
    accessors::Accessors,
    config::TextEncoding,
    record_type::RecordType,
    record_view::RecordView,
    registry::Primitive,
    text_view::{self, TextView},
    value::Value,
    view::{View, ViewShape},
};

/// An extension element: dispatches to named accessors of the record type that
/// declared it.
#[derive(Clone)]
pub struct ExtensionSlot {
    record: Arc<str>,
    accessors: Arc<Accessors>,
    getter: String,
    setter: String,
    endian: Endian,
}

impl ExtensionSlot {
    pub(crate) fn new(
        record: Arc<str>,
        accessors: Arc<Accessors>,
        getter: String,
        setter: String,
        endian: Endian,
    ) -> ExtensionSlot {
        ExtensionSlot {
            record,
            accessors,
            getter,
            setter,
            endian,
        }
    }

    pub fn getter_name(&self) -> &str {
        &self.getter
    }

    pub fn setter_name(&self) -> &str {
        &self.setter
    }

    fn get(&self, slot: &[u8]) -> Result<Value> {
        let getter = self.accessors.getter(&self.record, &self.getter)?;
        getter(slot, self.endian)
    }

    fn set(&self, slot: &mut [u8], value: &Value) -> Result<()> {
        let setter = self.accessors.setter(&self.record, &self.setter)?;
        setter(slot, value, self.endian)
    }
}

impl std::fmt::Debug for ExtensionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionSlot")
            .field("record", &self.record)
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .field("endian", &self.endian)
            .finish()
    }
}

/// The interpreter of one element slot.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Primitive { primitive: Primitive, endian: Endian },
    Text { encoding: TextEncoding },
    Record(RecordType),
    Extension(ExtensionSlot),
}

/// An element interpreter together with the slot's byte length.
#[derive(Debug, Clone)]
pub struct ElementType {
    kind: ElementKind,
    len: usize,
}

impl ElementType {
    pub(crate) fn new(kind: ElementKind, len: usize) -> ElementType {
        ElementType { kind, len }
    }

    pub fn primitive(primitive: Primitive, endian: Endian) -> ElementType {
        Self::new(ElementKind::Primitive { primitive, endian }, primitive.byte_len())
    }

    pub fn text(capacity: usize, encoding: TextEncoding) -> ElementType {
        Self::new(ElementKind::Text { encoding }, capacity)
    }

    /// Element type for records of `ty`, compiling the record type if needed.
    pub fn record(ty: &RecordType) -> Result<ElementType> {
        Ok(Self::new(ElementKind::Record(ty.clone()), ty.byte_len()?))
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Byte length of one slot.
    pub fn byte_len(&self) -> usize {
        self.len
    }

    /// Returns `true` if writing this element runs a user setter, directly or
    /// through a nested record field.
    pub(crate) fn has_extension(&self) -> Result<bool> {
        match &self.kind {
            ElementKind::Extension(_) => Ok(true),
            ElementKind::Record(ty) => Ok(ty.compile()?.has_extension()),
            _ => Ok(false),
        }
    }

    /// Returns `true` if a run of `other` elements may be byte-copied over a run of
    /// these elements.
    pub(crate) fn is_compatible(&self, other: &ElementType) -> bool {
        self.len == other.len
            && match (&self.kind, &other.kind) {
                (
                    ElementKind::Primitive { primitive: a, .. },
                    ElementKind::Primitive { primitive: b, .. },
                ) => a == b,
                (ElementKind::Text { .. }, ElementKind::Text { .. }) => true,
                (ElementKind::Record(a), ElementKind::Record(b)) => a == b,
                (ElementKind::Extension(a), ElementKind::Extension(b)) => {
                    a.getter == b.getter && a.setter == b.setter
                }
                _ => false,
            }
    }

    /// Returns `true` if a view of `shape` may be byte-copied into one slot.
    pub(crate) fn accepts_shape(&self, shape: ViewShape<'_>) -> bool {
        match (&self.kind, shape) {
            (_, ViewShape::Scalar) => false,
            (ElementKind::Text { .. }, ViewShape::Text { .. }) => true,
            (ElementKind::Record(ty), ViewShape::Record(other)) => ty == other,
            (ElementKind::Primitive { .. } | ElementKind::Extension(_), _) => true,
            _ => false,
        }
    }

    /// Returns a zero-copy view of the slot at `offset`.
    pub(crate) fn view<B: AsRef<[u8]>>(&self, buf: B, offset: usize) -> Result<View<B>> {
        match &self.kind {
            ElementKind::Primitive { primitive, endian } => {
                Ok(View::Scalar(primitive.read(buf.as_ref(), offset, *endian)))
            }
            ElementKind::Text { encoding } => Ok(View::Text(TextView::from_parts(
                buf, offset, self.len, *encoding,
            ))),
            ElementKind::Record(ty) => Ok(View::Record(RecordView::from_parts(
                ty.clone(),
                ty.compile()?,
                buf,
                offset,
            ))),
            ElementKind::Extension(ext) => {
                Ok(View::Scalar(ext.get(&buf.as_ref()[offset..offset + self.len])?))
            }
        }
    }

    /// Decodes the slot at `offset` into a plain value.
    pub(crate) fn read(&self, buf: &[u8], offset: usize) -> Result<Value> {
        match &self.kind {
            ElementKind::Primitive { primitive, endian } => {
                Ok(primitive.read(buf, offset, *endian))
            }
            ElementKind::Text { encoding } => Ok(Value::Text(text_view::decode(
                &buf[offset..offset + self.len],
                *encoding,
            ))),
            ElementKind::Record(ty) => ty.compile()?.read_record(buf, offset),
            ElementKind::Extension(ext) => ext.get(&buf[offset..offset + self.len]),
        }
    }

    /// Validates that `value` can be written into one slot without touching any byte.
    pub(crate) fn check(&self, value: Option<&Value>, field: &str) -> Result<()> {
        let value = match value {
            Some(value) if !value.is_null() => value,
            // Missing values default to zero, except extension setters still run.
            _ => return self.check_extension(field),
        };
        match &self.kind {
            ElementKind::Primitive { primitive, .. } if primitive.accepts(value) => Ok(()),
            ElementKind::Primitive { .. } => Err(mismatch(field, "number", value)),
            ElementKind::Text { .. } if value.as_str().is_some() => Ok(()),
            ElementKind::Text { .. } => Err(mismatch(field, "text", value)),
            ElementKind::Record(ty) => ty.compile()?.check_record(Some(value), field),
            ElementKind::Extension(_) => self.check_extension(field),
        }
    }

    fn check_extension(&self, field: &str) -> Result<()> {
        match &self.kind {
            ElementKind::Extension(ext) => ext
                .accessors
                .setter(&ext.record, &ext.setter)
                .map(|_| ())
                .map_err(|e| {
                    log::debug!("field '{field}' cannot be written: {e}");
                    e
                }),
            ElementKind::Record(ty) => ty.compile()?.check_record(None, field),
            _ => Ok(()),
        }
    }

    /// Encodes `value` into the slot at `offset`; a missing value writes the
    /// zero/empty default.
    ///
    /// Callers run [`ElementType::check`] first.
    pub(crate) fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: Option<&Value>,
        field: &str,
    ) -> Result<()> {
        let value = value.filter(|v| !v.is_null());
        match &self.kind {
            ElementKind::Primitive { primitive, endian } => {
                primitive.write(buf, offset, value.unwrap_or(&Value::Null), *endian)
            }
            ElementKind::Text { encoding } => {
                let slot = &mut buf[offset..offset + self.len];
                match value {
                    None => slot.fill(0),
                    Some(Value::Text(text)) => {
                        text_view::encode_into(text, slot, *encoding);
                    }
                    Some(other) => return Err(mismatch(field, "text", other)),
                }
                Ok(())
            }
            ElementKind::Record(ty) => ty.compile()?.write_record(buf, offset, value),
            ElementKind::Extension(ext) => ext.set(
                &mut buf[offset..offset + self.len],
                value.unwrap_or(&Value::Null),
            ),
        }
    }

    /// Validates a plain list destined for a run of `count` slots. Only the values
    /// that fit are inspected.
    pub(crate) fn check_run(&self, values: Option<&Value>, count: usize, field: &str) -> Result<()> {
        let items = match values {
            None | Some(Value::Null) => &[][..],
            Some(Value::List(items)) => items.as_slice(),
            Some(other) => return Err(mismatch(field, "list", other)),
        };
        for index in 0..count {
            self.check(items.get(index), field)?;
        }
        Ok(())
    }

    /// Zero-fills a run of `count` slots at `offset`, then writes `items`
    /// left-to-right. Values beyond `count` are ignored; slots without a value
    /// keep their default.
    pub(crate) fn write_run(
        &self,
        buf: &mut [u8],
        offset: usize,
        count: usize,
        items: &[Value],
        field: &str,
    ) -> Result<()> {
        buf[offset..offset + count * self.len].fill(0);
        for index in 0..count {
            self.write(buf, offset + index * self.len, items.get(index), field)?;
        }
        Ok(())
    }

    /// Materializes a run of `count` slots at `offset` into a plain list.
    pub(crate) fn read_run(&self, buf: &[u8], offset: usize, count: usize) -> Result<Value> {
        (0..count)
            .map(|index| self.read(buf, offset + index * self.len))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

/// Runs `write` over `buf[range]`, going through a scratch copy of the range when
/// `staged` is set. A staged write that fails leaves `buf` untouched.
///
/// `write` receives the target buffer and the offset that `range.start` maps to.
pub(crate) fn write_staged<F>(
    buf: &mut [u8],
    range: Range<usize>,
    staged: bool,
    write: F,
) -> Result<()>
where
    F: FnOnce(&mut [u8], usize) -> Result<()>,
{
    if !staged {
        return write(buf, range.start);
    }
    let mut scratch = buf[range.clone()].to_vec();
    write(&mut scratch, 0)?;
    buf[range].copy_from_slice(&scratch);
    Ok(())
}

pub(crate) fn mismatch(field: &str, expected: &str, value: &Value) -> Error {
    Error::value_mismatch(field, format!("{expected}, got {}", value.kind_name()))
}
