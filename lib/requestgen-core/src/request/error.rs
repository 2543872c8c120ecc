use std::error::Error;
use std::fmt;

use super::descriptor::ValueKind;

/// A provided parameter set does not satisfy the descriptor set.
///
/// Raised before any network call. The same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ValidationError {
    /// A required field has no value.
    #[display("{field} is required, no value given")]
    MissingRequired {
        /// Wire name of the field.
        field: String,
    },

    /// A required field was given as an empty string or an empty list.
    #[display("{field} is required, empty value given")]
    EmptyRequired {
        /// Wire name of the field.
        field: String,
    },

    /// The value variant does not match the declared kind.
    #[display("{field} expects a {expected} value, got {found}")]
    KindMismatch {
        /// Wire name of the field.
        field: String,
        /// Declared kind.
        expected: ValueKind,
        /// Provided variant.
        found: &'static str,
    },

    /// A value was provided for a name the request does not declare.
    #[display("{field} is not a parameter of this request")]
    Undeclared {
        /// The unknown name.
        field: String,
    },
}

impl ValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field }
            | Self::EmptyRequired { field }
            | Self::KindMismatch { field, .. }
            | Self::Undeclared { field } => field,
        }
    }
}

/// A [`RequestSpec`](super::RequestSpec) definition is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum SpecError {
    /// The URL template contains a `:` not followed by a placeholder name.
    #[display("invalid URL template '{template}': empty placeholder at byte {position}")]
    InvalidTemplate {
        /// The template.
        template: String,
        /// Byte offset of the dangling `:`.
        position: usize,
    },

    /// Two descriptors share a wire name.
    #[display("parameter '{name}' is declared more than once")]
    DuplicateParameter {
        /// The repeated name.
        name: String,
    },

    /// A template placeholder has no slug descriptor.
    #[display("placeholder ':{slug}' in '{template}' has no slug parameter")]
    UndeclaredSlug {
        /// The template.
        template: String,
        /// The placeholder name.
        slug: String,
    },

    /// A slug descriptor has no placeholder in the template.
    #[display("slug parameter '{slug}' does not appear in '{template}'")]
    UnusedSlug {
        /// The template.
        template: String,
        /// The descriptor name.
        slug: String,
    },

    /// The response data path has an empty segment.
    #[display("invalid response data path '{path}'")]
    InvalidDataPath {
        /// The rejected path.
        path: String,
    },
}

/// Stage at which a response failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// The top-level response body.
    Envelope,
    /// Walking the nested data path.
    Path,
    /// The payload reached through the data path.
    Payload,
}

/// A response body does not match the expected shape.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum DecodeError {
    /// The top-level body could not be decoded.
    #[display("failed to decode response envelope at '{path}': {error}")]
    Envelope {
        /// JSON path of the failure inside the body.
        path: String,
        /// The underlying JSON error.
        #[error(source)]
        error: serde_json::Error,
    },

    /// A data path segment is absent from the envelope.
    #[display("response envelope has nothing at '{segment}'")]
    MissingSegment {
        /// The data path up to and including the missing segment.
        segment: String,
    },

    /// The value holding a data path segment is not an object.
    #[display("cannot reach '{segment}' in response envelope: parent is not an object")]
    NotAnObject {
        /// The data path up to and including the offending segment.
        segment: String,
    },

    /// The nested payload could not be decoded.
    #[display("failed to decode payload at '{segment}' (inner path '{path}'): {error}")]
    Payload {
        /// The full data path.
        segment: String,
        /// JSON path of the failure inside the payload.
        path: String,
        /// The underlying JSON error.
        #[error(source)]
        error: serde_json::Error,
    },
}

impl DecodeError {
    /// Stage at which decoding failed.
    pub fn stage(&self) -> DecodeStage {
        match self {
            Self::Envelope { .. } => DecodeStage::Envelope,
            Self::MissingSegment { .. } | Self::NotAnObject { .. } => DecodeStage::Path,
            Self::Payload { .. } => DecodeStage::Payload,
        }
    }
}

/// Opaque failure reported by the authenticated transport.
///
/// The original error is kept intact and can be recovered with
/// [`downcast_ref`](Self::downcast_ref) or [`into_inner`](Self::into_inner).
pub struct TransportError(Box<dyn Error + Send + Sync>);

impl TransportError {
    /// Wraps a transport error.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(error.into())
    }

    /// Borrows the original error as a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref()
    }

    /// Returns the original error.
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.0
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransportError").field(&self.0).finish()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport failure: {}", self.0)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.0)
    }
}

/// Errors produced while preparing, sending or decoding a request.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RequestError {
    /// Parameters do not satisfy the descriptor set.
    Validation(ValidationError),

    /// The resolved URL still has placeholders without values.
    #[display("URL template '{template}' has unresolved placeholders: {missing:?}")]
    #[from(skip)]
    UnresolvedSlug {
        /// The template.
        template: String,
        /// Placeholder names without a value.
        missing: Vec<String>,
    },

    /// The body map could not be marshalled.
    #[display("failed to encode request body: {_0}")]
    BodyEncoding(serde_json::Error),

    /// The body map could not be form-encoded.
    #[display("failed to encode form body: {_0}")]
    FormEncoding(serde_urlencoded::ser::Error),

    /// Failure from the transport, passed through unchanged.
    Transport(TransportError),

    /// The response did not match the expected shape.
    Decode(DecodeError),
}

impl RequestError {
    /// Whether the error was raised locally, before any network I/O.
    ///
    /// Local errors fail the same way for the same input and are never retried.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnresolvedSlug { .. }
                | Self::BodyEncoding(_)
                | Self::FormEncoding(_)
        )
    }
}
