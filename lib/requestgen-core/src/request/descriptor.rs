use std::fmt;

/// Where a request parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Encoded into the query string.
    Query,
    /// Encoded into the request body (or the query string for body-less methods).
    Body,
    /// Substituted into a `:name` placeholder of the URL template.
    Slug,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Query => "query",
            Self::Body => "body",
            Self::Slug => "slug",
        };
        f.write_str(name)
    }
}

/// Kind of a single scalar value, also used as the element kind of lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Free text, passed through.
    String,
    /// Signed integer, passed through.
    Integer,
    /// Point in time, encoded as milliseconds since the Unix epoch.
    Timestamp,
    /// Enumeration, encoded as its canonical wire name.
    Enum,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Timestamp => "timestamp",
            Self::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Value kind declared by a [`ParameterDescriptor`].
///
/// Lists only hold scalars, so every list parameter expands to a flat
/// sequence of `key[]=value` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// An ordered sequence of scalars of the same kind.
    List(ScalarKind),
}

impl ValueKind {
    /// Shorthand for `ValueKind::Scalar(ScalarKind::String)`.
    pub const STRING: Self = Self::Scalar(ScalarKind::String);
    /// Shorthand for `ValueKind::Scalar(ScalarKind::Integer)`.
    pub const INTEGER: Self = Self::Scalar(ScalarKind::Integer);
    /// Shorthand for `ValueKind::Scalar(ScalarKind::Timestamp)`.
    pub const TIMESTAMP: Self = Self::Scalar(ScalarKind::Timestamp);
    /// Shorthand for `ValueKind::Scalar(ScalarKind::Enum)`.
    pub const ENUM: Self = Self::Scalar(ScalarKind::Enum);
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "list of {kind}"),
        }
    }
}

/// Static schema entry for one request field.
///
/// Descriptors are `const`-constructible so a request type can declare its
/// descriptor set as a `static` slice:
///
/// ```rust
/// use requestgen_core::{ParameterDescriptor, ValueKind};
///
/// static PARAMS: &[ParameterDescriptor] = &[
///     ParameterDescriptor::query("a", ValueKind::STRING).required(),
///     ParameterDescriptor::query("s", ValueKind::TIMESTAMP),
///     ParameterDescriptor::slug("metric", ValueKind::STRING),
/// ];
/// assert!(PARAMS[0].is_required());
/// assert!(PARAMS[2].is_required());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    name: &'static str,
    location: ParamLocation,
    required: bool,
    kind: ValueKind,
}

impl ParameterDescriptor {
    /// An optional query-string parameter.
    pub const fn query(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            location: ParamLocation::Query,
            required: false,
            kind,
        }
    }

    /// An optional body parameter.
    pub const fn body(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            location: ParamLocation::Body,
            required: false,
            kind,
        }
    }

    /// A URL path slug. Slugs are always required.
    pub const fn slug(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            location: ParamLocation::Slug,
            required: true,
            kind,
        }
    }

    /// Marks this descriptor as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The wire key.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Where the parameter is encoded.
    pub const fn location(&self) -> ParamLocation {
        self.location
    }

    /// Whether a value must be provided.
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// The declared value kind.
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }
}
