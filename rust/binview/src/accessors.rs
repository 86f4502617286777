//! Extension accessors: the getter and setter methods a record type implements
//! for the extension types declared in its registry.
//!
//! Accessors operate on the raw bytes of one element slot. They are looked up by
//! the names a configurator assigned to the field, and only when that field is
//! actually read or written.

use std::sync::Arc;

use ahash::AHashMap;
use binview_bytes::Endian;
use binview_common::{Result, error::Error};

use crate::value::Value;

/// Reads a plain value from an element slot.
pub type Getter = Arc<dyn Fn(&[u8], Endian) -> Result<Value> + Send + Sync>;

/// Writes a plain value into an element slot. Missing values arrive as [`Value::Null`].
pub type Setter = Arc<dyn Fn(&mut [u8], &Value, Endian) -> Result<()> + Send + Sync>;

/// A record type's table of named extension accessors.
#[derive(Clone, Default)]
pub struct Accessors {
    getters: AHashMap<String, Getter>,
    setters: AHashMap<String, Setter>,
}

impl Accessors {
    pub fn new() -> Accessors {
        Accessors::default()
    }

    pub fn add_getter<F>(&mut self, method: impl Into<String>, getter: F)
    where
        F: Fn(&[u8], Endian) -> Result<Value> + Send + Sync + 'static,
    {
        self.getters.insert(method.into(), Arc::new(getter));
    }

    pub fn add_setter<F>(&mut self, method: impl Into<String>, setter: F)
    where
        F: Fn(&mut [u8], &Value, Endian) -> Result<()> + Send + Sync + 'static,
    {
        self.setters.insert(method.into(), Arc::new(setter));
    }

    pub fn has_getter(&self, method: &str) -> bool {
        self.getters.contains_key(method)
    }

    pub fn has_setter(&self, method: &str) -> bool {
        self.setters.contains_key(method)
    }

    /// Looks up a getter, failing with a missing-accessor error naming `record`.
    pub fn getter(&self, record: &str, method: &str) -> Result<&Getter> {
        self.getters
            .get(method)
            .ok_or_else(|| Error::missing_accessor(record, method))
    }

    /// Looks up a setter, failing with a missing-accessor error naming `record`.
    pub fn setter(&self, record: &str, method: &str) -> Result<&Setter> {
        self.setters
            .get(method)
            .ok_or_else(|| Error::missing_accessor(record, method))
    }
}

impl std::fmt::Debug for Accessors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessors")
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}
