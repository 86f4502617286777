//! Layout configuration attached to a record type.

use binview_bytes::Endian;

/// Default upper bound on a compiled record's byte length.
pub const MAX_RECORD_LEN: usize = u32::MAX as usize;

/// Encoding used to store text in fixed-capacity text slots.
///
/// Capacity is always counted in bytes, never in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    /// UTF-8. Text that does not fit is truncated at the last whole code point.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per code point. Code points above U+00FF are stored as `?`.
    Latin1,
}

/// Configuration for compiling a record type's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Byte order of multi-byte fields that do not set `little_endian` explicitly.
    pub default_endian: Endian,
    /// Encoding of text fields and text sequences.
    pub text_encoding: TextEncoding,
    /// Compilation fails for records whose fixed length exceeds this bound.
    pub max_record_len: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_endian: Endian::Big,
            text_encoding: TextEncoding::Utf8,
            max_record_len: MAX_RECORD_LEN,
        }
    }
}

impl LayoutConfig {
    pub fn with_default_endian(mut self, endian: Endian) -> Self {
        self.default_endian = endian;
        self
    }

    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    pub fn with_max_record_len(mut self, max_record_len: usize) -> Self {
        self.max_record_len = max_record_len;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_record_len == 0 {
            return Err("max_record_len must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.default_endian, Endian::Big);
        assert_eq!(config.text_encoding, TextEncoding::Utf8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_bound() {
        let config = LayoutConfig::default().with_max_record_len(0);
        assert!(config.validate().is_err());
    }
}
