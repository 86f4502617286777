//! Compiled record layouts.
//!
//! A layout is derived from a schema exactly once per record type. Each field is
//! assigned a byte offset (the running sum of the preceding fields' total lengths),
//! an element interpreter and an optional element count.

use std::sync::Arc;

use ahash::AHashMap;
use binview_bytes::Endian;
use binview_common::{Result, error::Error};

use crate::{
    accessors::Accessors,
    array_view::{ArrayType, ArrayView},
    config::LayoutConfig,
    element::{self, ElementKind, ElementType, ExtensionSlot},
    registry::{TypeRegistry, ViewKind},
    schema::Schema,
    value::{Object, Value},
    view::View,
};

/// Resolved placement and interpretation of one field.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    name: String,
    index: usize,
    byte_offset: usize,
    element: ElementType,
    size: Option<usize>,
    total_len: usize,
    endian: Endian,
    kind: ViewKind,
    getter: String,
    setter: String,
}

impl FieldLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field in schema order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset of the field relative to the start of the record.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn element_len(&self) -> usize {
        self.element.byte_len()
    }

    /// Element count of a sequence field, `None` for scalar fields.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn is_sequence(&self) -> bool {
        self.size.is_some()
    }

    /// `element_len * size` for sequence fields, `element_len` otherwise.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn view_kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn getter_name(&self) -> &str {
        &self.getter
    }

    pub fn setter_name(&self) -> &str {
        &self.setter
    }

    /// Zero-copy access to the field of the record starting at `base`.
    pub(crate) fn view<B: AsRef<[u8]>>(&self, buf: B, base: usize) -> Result<View<B>> {
        let offset = base + self.byte_offset;
        match self.size {
            Some(_) => Ok(View::Array(ArrayView::from_parts(
                ArrayType::new(self.element.clone()),
                buf,
                offset,
                self.total_len,
            ))),
            None => self.element.view(buf, offset),
        }
    }

    pub(crate) fn read(&self, buf: &[u8], base: usize) -> Result<Value> {
        let offset = base + self.byte_offset;
        match self.size {
            Some(size) => self.element.read_run(buf, offset, size),
            None => self.element.read(buf, offset),
        }
    }

    pub(crate) fn check(&self, value: Option<&Value>) -> Result<()> {
        match self.size {
            Some(size) => self.element.check_run(value, size, &self.name),
            None => self.element.check(value, &self.name),
        }
    }

    pub(crate) fn write(&self, buf: &mut [u8], base: usize, value: Option<&Value>) -> Result<()> {
        self.write_at(buf, base + self.byte_offset, value)
    }

    /// Writes the field's bytes starting at the absolute `offset`.
    pub(crate) fn write_at(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: Option<&Value>,
    ) -> Result<()> {
        match self.size {
            Some(size) => {
                let items = match value {
                    None | Some(Value::Null) => &[][..],
                    Some(Value::List(items)) => items.as_slice(),
                    Some(other) => return Err(element::mismatch(&self.name, "list", other)),
                };
                self.element.write_run(buf, offset, size, items, &self.name)
            }
            None => self.element.write(buf, offset, value, &self.name),
        }
    }

    /// Byte range of the field within a buffer holding the record at `base`.
    pub(crate) fn range(&self, base: usize) -> std::ops::Range<usize> {
        let start = base + self.byte_offset;
        start..start + self.total_len
    }
}

/// The compiled layout of a record type.
#[derive(Debug, Clone)]
pub struct Layout {
    fields: Vec<FieldLayout>,
    by_name: AHashMap<String, usize>,
    byte_len: usize,
    has_extension: bool,
}

impl Layout {
    /// Fixed byte length of every record of this type.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Returns `true` if any field, nested ones included, writes through a user
    /// setter.
    pub fn has_extension(&self) -> bool {
        self.has_extension
    }

    /// Materializes the record at `offset` into an object keyed in schema order.
    pub(crate) fn read_record(&self, buf: &[u8], offset: usize) -> Result<Value> {
        let mut object = Object::with_capacity(self.fields.len());
        for field in &self.fields {
            object.insert(field.name.as_str(), field.read(buf, offset)?);
        }
        Ok(Value::Object(object))
    }

    /// Validates a plain object (or a missing value) against every field.
    pub(crate) fn check_record(&self, value: Option<&Value>, field: &str) -> Result<()> {
        let object = match value {
            None | Some(Value::Null) => None,
            Some(Value::Object(object)) => Some(object),
            Some(other) => return Err(element::mismatch(field, "object", other)),
        };
        for layout in &self.fields {
            layout.check(object.and_then(|o| o.get(&layout.name)))?;
        }
        Ok(())
    }

    /// Writes every field of the record at `offset`. Properties absent from `value`
    /// take their zero/empty default; previous contents are never merged.
    pub(crate) fn write_record(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: Option<&Value>,
    ) -> Result<()> {
        let object = match value {
            Some(Value::Object(object)) => Some(object),
            _ => None,
        };
        for layout in &self.fields {
            layout.write(buf, offset, object.and_then(|o| o.get(&layout.name)))?;
        }
        Ok(())
    }
}

/// Compiles `schema` into a layout.
///
/// Fields are resolved through `registry` in declaration order; nested record
/// types are compiled first if needed. Extension fields dispatch to `accessors`,
/// which are looked up only when the field is accessed.
pub(crate) fn compile(
    record: &str,
    schema: &Schema,
    registry: &TypeRegistry,
    accessors: &Arc<Accessors>,
    config: &LayoutConfig,
) -> Result<Layout> {
    config
        .validate()
        .map_err(|message| Error::invalid_arg("config", message))?;

    let record_name: Arc<str> = Arc::from(record);
    let mut fields = Vec::with_capacity(schema.len());
    let mut by_name = AHashMap::with_capacity(schema.len());
    let mut byte_offset = 0usize;
    let mut has_extension = false;

    for (index, (name, spec)) in schema.fields().iter().enumerate() {
        let resolved = registry.resolve(spec)?;
        let endian = spec
            .get_little_endian()
            .map(Endian::from_little)
            .unwrap_or(config.default_endian);

        let element_kind = match &resolved.kind {
            ViewKind::Primitive(primitive) => ElementKind::Primitive {
                primitive: *primitive,
                endian,
            },
            ViewKind::Text => ElementKind::Text {
                encoding: config.text_encoding,
            },
            ViewKind::Record(ty) => ElementKind::Record(ty.clone()),
            ViewKind::Extension => ElementKind::Extension(ExtensionSlot::new(
                record_name.clone(),
                accessors.clone(),
                resolved.getter.clone(),
                resolved.setter.clone(),
                endian,
            )),
        };
        let element = ElementType::new(element_kind, resolved.element_len);
        has_extension |= element.has_extension()?;

        let size = spec.get_size();
        if size.is_some() && element.byte_len() == 0 {
            return Err(Error::invalid_arg(
                name.as_str(),
                "sequence fields require a non-empty element type",
            ));
        }
        let total_len = element.byte_len().checked_mul(size.unwrap_or(1));
        let end = total_len.and_then(|total| byte_offset.checked_add(total));
        let total_len = match (total_len, end) {
            (Some(total_len), Some(end)) if end <= config.max_record_len => total_len,
            _ => {
                return Err(Error::invalid_arg(
                    "max_record_len",
                    format!(
                        "record '{record}' exceeds {} bytes at field '{name}'",
                        config.max_record_len
                    ),
                ));
            }
        };

        log::trace!(
            "{record}.{name}: type={} offset={byte_offset} element_len={} size={size:?}",
            spec.type_name(),
            element.byte_len(),
        );

        by_name.insert(name.clone(), index);
        fields.push(FieldLayout {
            name: name.clone(),
            index,
            byte_offset,
            element,
            size,
            total_len,
            endian,
            kind: resolved.kind,
            getter: resolved.getter,
            setter: resolved.setter,
        });
        byte_offset += total_len;
    }

    log::debug!(
        "compiled record '{record}': {} fields, {byte_offset} bytes",
        fields.len()
    );

    Ok(Layout {
        fields,
        by_name,
        byte_len: byte_offset,
        has_extension,
    })
}
