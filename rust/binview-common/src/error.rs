use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_type(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidType { name: name.into() }.into())
    }

    pub fn unknown_field(record: impl Into<String>, field: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnknownField {
                record: record.into(),
                field: field.into(),
            }
            .into(),
        )
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, len }.into())
    }

    pub fn invalid_length(byte_len: usize, element_len: usize) -> Error {
        Error(
            ErrorKind::InvalidLength {
                byte_len,
                element_len,
            }
            .into(),
        )
    }

    pub fn out_of_bounds(offset: usize, len: usize, available: usize) -> Error {
        Error(
            ErrorKind::OutOfBounds {
                offset,
                len,
                available,
            }
            .into(),
        )
    }

    pub fn value_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Error {
        Error(
            ErrorKind::ValueMismatch {
                field: field.into(),
                expected: expected.into(),
            }
            .into(),
        )
    }

    pub fn view_mismatch(field: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::ViewMismatch {
                field: field.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn missing_accessor(record: impl Into<String>, method: impl Into<String>) -> Error {
        Error(
            ErrorKind::MissingAccessor {
                record: record.into(),
                method: method.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` for errors raised while compiling a schema.
    pub fn is_schema_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidType { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("Type \"{name}\" is not a valid type.")]
    InvalidType { name: String },

    #[error("unknown field '{field}' in record '{record}'")]
    UnknownField { record: String, field: String },

    #[error("index {index} is out of range for a sequence of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("byte length {byte_len} is not a multiple of the element length {element_len}")]
    InvalidLength { byte_len: usize, element_len: usize },

    #[error("view of {len} bytes at offset {offset} does not fit into a buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("invalid value for '{field}': expected {expected}")]
    ValueMismatch { field: String, expected: String },

    #[error("incompatible view for '{field}': {message}")]
    ViewMismatch { field: String, message: String },

    #[error("record '{record}' does not implement accessor '{method}'")]
    MissingAccessor { record: String, method: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_type_message() {
        let e = Error::invalid_type("Int128");
        assert_eq!(e.to_string(), "Type \"Int128\" is not a valid type.");
        assert!(e.is_schema_error());
    }

    #[test]
    fn test_into_kind() {
        let e = Error::index_out_of_range(5, 3);
        assert!(!e.is_schema_error());
        match e.into_kind() {
            ErrorKind::IndexOutOfRange { index, len } => {
                assert_eq!(index, 5);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
