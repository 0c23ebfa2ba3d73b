//! Error types for the ProtoCodec encode / decode pipeline.

use thiserror::Error;

/// Coarse classification of a [`CodecError`].
///
/// Callers that only need to tell "corrupt bytes" from "value too large for
/// this platform" from "bad JSON" match on this instead of the full enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Truncated or structurally invalid wire bytes.
    MalformedInput,
    /// An integer does not fit its target width or the active integer strategy.
    Overflow,
    /// A JSON value cannot be coerced to the field's declared type.
    TypeCoercion,
    /// A record or partial carries a value of the wrong type, or an undeclared field.
    InvalidRecord,
    /// A message type name did not resolve in the registry.
    UnknownSchema,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::Overflow => "overflow",
            ErrorKind::TypeCoercion => "type_coercion",
            ErrorKind::InvalidRecord => "invalid_record",
            ErrorKind::UnknownSchema => "unknown_schema",
        };
        write!(f, "{s}")
    }
}

/// Errors raised by the record codec (wire, JSON and partial paths).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Malformed wire input at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("Integer overflow in field '{field}': {value} does not fit {target}")]
    Overflow {
        field: String,
        value: String,
        target: String,
    },

    #[error("Cannot coerce field '{field}' to {expected}: got {got}")]
    TypeCoercion {
        field: String,
        expected: String,
        got: String,
    },

    #[error("Type mismatch in field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("Field '{field}' is not declared in '{schema}'")]
    UnknownField { schema: String, field: String },

    #[error("Schema '{name}' not found")]
    SchemaNotFound { name: String },
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Malformed { .. } => ErrorKind::MalformedInput,
            CodecError::Overflow { .. } => ErrorKind::Overflow,
            CodecError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            CodecError::TypeMismatch { .. } | CodecError::UnknownField { .. } => {
                ErrorKind::InvalidRecord
            }
            CodecError::SchemaNotFound { .. } => ErrorKind::UnknownSchema,
        }
    }

    pub fn is_overflow(&self) -> bool {
        self.kind() == ErrorKind::Overflow
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CodecError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(
        field: impl Into<String>,
        value: impl ToString,
        target: impl Into<String>,
    ) -> Self {
        CodecError::Overflow {
            field: field.into(),
            value: value.to_string(),
            target: target.into(),
        }
    }

    /// Attach a field path to an overflow raised below the field level
    /// (e.g. by the wire reader, which does not know field names).
    pub(crate) fn in_field(self, path: &str) -> Self {
        match self {
            CodecError::Overflow { field, value, target } if field.is_empty() => {
                CodecError::Overflow {
                    field: path.to_string(),
                    value,
                    target,
                }
            }
            other => other,
        }
    }
}

/// Errors from schema parsing and the schema registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Schema '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Schema '{name}' not found")]
    NotFound { name: String },

    #[error("Schema validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Unresolved reference in '{owner}': type '{target}' is not registered")]
    UnresolvedReference { owner: String, target: String },

    #[error("Parse error in PSDL: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Remote error {code}: {message}")]
    Remote { code: u32, message: String },

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("{0}")]
    Other(String),
}

/// Errors from a service call: resolution, encoding, dispatch, decoding.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Service '{service}' not found")]
    UnknownService { service: String },

    #[error("Method '{method}' not found on service '{service}'")]
    UnknownMethod { service: String, method: String },

    #[error("Method '{method}' expects request type {expected}, got {got}")]
    RequestType {
        method: String,
        expected: String,
        got: String,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that can occur during batch decoding.
#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("Decode error at index {index}: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error("Schema error: {0}")]
    Schema(CodecError),

    #[error("{0}")]
    Other(String),
}
