//! Record types: a named schema together with its type registry, extension
//! accessors and layout configuration.
//!
//! A record type is declared once through [`RecordTypeBuilder`] and is immutable
//! afterwards. Its layout is compiled lazily on first use and cached; cloning a
//! record type is cheap and clones share the compiled layout.

use std::sync::{Arc, OnceLock};

use binview_bytes::{ByteBuffer, Endian};
use binview_common::{Result, error::Error};

use crate::{
    accessors::Accessors,
    config::LayoutConfig,
    layout::{self, Layout},
    record_view::RecordView,
    registry::{FieldConfig, TypeRegistry},
    schema::{FieldSpec, Schema},
    value::Value,
};

struct RecordTypeInner {
    name: String,
    schema: Schema,
    registry: TypeRegistry,
    accessors: Arc<Accessors>,
    config: LayoutConfig,
    layout: OnceLock<Arc<Layout>>,
}

/// A declared record type. Equality is identity: two separately built types with
/// the same schema are different types.
#[derive(Clone)]
pub struct RecordType(Arc<RecordTypeInner>);

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn schema(&self) -> &Schema {
        &self.0.schema
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.0.registry
    }

    pub fn accessors(&self) -> &Accessors {
        &self.0.accessors
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.0.config
    }

    pub fn is_compiled(&self) -> bool {
        self.0.layout.get().is_some()
    }

    /// Returns the compiled layout, compiling it on first call.
    ///
    /// # Errors
    ///
    /// Fails if a field refers to an unregistered type name, if a configurator
    /// rejects its field spec, or if the record exceeds the configured maximum
    /// length. A failed compilation is not cached.
    pub fn compile(&self) -> Result<Arc<Layout>> {
        if let Some(layout) = self.0.layout.get() {
            return Ok(layout.clone());
        }
        let compiled = layout::compile(
            &self.0.name,
            &self.0.schema,
            &self.0.registry,
            &self.0.accessors,
            &self.0.config,
        )
        .inspect_err(|e| log::debug!("failed to compile record '{}': {e}", self.0.name))?;
        Ok(self.0.layout.get_or_init(|| Arc::new(compiled)).clone())
    }

    /// The compiled layout, if compilation already happened.
    pub fn layout(&self) -> Option<&Arc<Layout>> {
        self.0.layout.get()
    }

    /// Fixed byte length of records of this type.
    pub fn byte_len(&self) -> Result<usize> {
        Ok(self.compile()?.byte_len())
    }

    /// Allocates a zeroed buffer of exactly one record and wraps it.
    pub fn zeroed(&self) -> Result<RecordView<ByteBuffer>> {
        let layout = self.compile()?;
        let buf = ByteBuffer::zeroed(layout.byte_len());
        Ok(RecordView::from_parts(self.clone(), layout, buf, 0))
    }

    /// Allocates a new record and writes every field from `value`; absent
    /// properties take zero/empty defaults.
    pub fn from_value(&self, value: &Value) -> Result<RecordView<ByteBuffer>> {
        let mut view = self.zeroed()?;
        view.fill(value)?;
        Ok(view)
    }

    /// Wraps the record stored at `offset` of an existing buffer.
    pub fn view<B: AsRef<[u8]>>(&self, buf: B, offset: usize) -> Result<RecordView<B>> {
        RecordView::new(self, buf, offset)
    }

    /// Wraps a `(buffer, offset, byte_len)` region, which must hold exactly one record.
    pub fn view_region<B: AsRef<[u8]>>(
        &self,
        buf: B,
        offset: usize,
        byte_len: usize,
    ) -> Result<RecordView<B>> {
        let expected = self.byte_len()?;
        if byte_len != expected {
            return Err(Error::invalid_arg(
                "byte_len",
                format!("record '{}' is {expected} bytes, got {byte_len}", self.name()),
            ));
        }
        self.view(buf, offset)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RecordType {}

impl std::fmt::Debug for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.0.name)
            .field("fields", &self.0.schema.len())
            .field("is_compiled", &self.is_compiled())
            .finish()
    }
}

/// Declares a record type.
///
/// ```
/// use binview::{FieldSpec, RecordType, object};
///
/// let pet = RecordType::builder("Pet")
///     .field("age", FieldSpec::new("int8"))
///     .field("name", FieldSpec::text(10))
///     .build();
/// assert_eq!(pet.byte_len().unwrap(), 11);
///
/// let view = pet.from_value(&object! { "age" => 3, "name" => "tuzik" }).unwrap();
/// assert_eq!(view.get_value("name").unwrap().as_str(), Some("tuzik"));
/// ```
pub struct RecordTypeBuilder {
    name: String,
    schema: Schema,
    registry: TypeRegistry,
    accessors: Accessors,
    config: LayoutConfig,
}

impl RecordTypeBuilder {
    /// Starts a record type whose registry holds the built-in types.
    pub fn new(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            schema: Schema::new(),
            registry: TypeRegistry::builtin(),
            accessors: Accessors::new(),
            config: LayoutConfig::default(),
        }
    }

    /// Appends a field.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty or already declared.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.schema.add_field(name, spec);
        self
    }

    /// Replaces the whole schema.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Replaces the registry, e.g. with [`TypeRegistry::empty`].
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Adds or overrides a type name in this record type's registry.
    pub fn register<F>(mut self, type_name: impl Into<String>, configurator: F) -> Self
    where
        F: Fn(&FieldSpec) -> Result<FieldConfig> + Send + Sync + 'static,
    {
        self.registry.register(type_name, configurator);
        self
    }

    /// Makes `ty` addressable by its name in field specs.
    pub fn register_record(mut self, ty: &RecordType) -> Self {
        self.registry.register_record(ty);
        self
    }

    /// Implements the extension getter `method`.
    pub fn getter<F>(mut self, method: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&[u8], Endian) -> Result<Value> + Send + Sync + 'static,
    {
        self.accessors.add_getter(method, getter);
        self
    }

    /// Implements the extension setter `method`.
    pub fn setter<F>(mut self, method: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut [u8], &Value, Endian) -> Result<()> + Send + Sync + 'static,
    {
        self.accessors.add_setter(method, setter);
        self
    }

    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Finishes the declaration. The layout is compiled on first use.
    pub fn build(self) -> RecordType {
        RecordType(Arc::new(RecordTypeInner {
            name: self.name,
            schema: self.schema,
            registry: self.registry,
            accessors: Arc::new(self.accessors),
            config: self.config,
            layout: OnceLock::new(),
        }))
    }

    /// Finishes the declaration and compiles the layout right away.
    pub fn try_build(self) -> Result<RecordType> {
        let ty = self.build();
        ty.compile()?;
        Ok(ty)
    }
}
