use std::borrow::Cow;

use indexmap::IndexMap;
use jiff::Timestamp;

use super::descriptor::{ScalarKind, ValueKind};

/// An enumeration that has a canonical wire name.
///
/// ```rust
/// use requestgen_core::{ParameterValue, WireEnum};
///
/// #[derive(Debug, Clone, Copy)]
/// enum Interval { Hour, Day }
///
/// impl WireEnum for Interval {
///     fn wire_name(&self) -> &'static str {
///         match self {
///             Self::Hour => "1h",
///             Self::Day => "24h",
///         }
///     }
/// }
///
/// let value = ParameterValue::enumeration(Interval::Day);
/// assert_eq!(value, ParameterValue::Enum("24h".into()));
/// ```
pub trait WireEnum {
    /// The string sent on the wire for this variant.
    fn wire_name(&self) -> &'static str;
}

/// Runtime value of a request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// Free text.
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Point in time.
    Timestamp(Timestamp),
    /// Canonical wire name of an enumeration variant.
    Enum(Cow<'static, str>),
    /// Ordered sequence of scalar values.
    List(Vec<ParameterValue>),
}

impl ParameterValue {
    /// Builds an enum value from its wire name.
    pub fn enumeration(value: impl WireEnum) -> Self {
        Self::Enum(Cow::Borrowed(value.wire_name()))
    }

    /// Builds a list value from anything convertible into values.
    pub fn list<T>(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Short description of the variant, used in error messages.
    pub(in crate::request) fn variant_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Timestamp(_) => "timestamp",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }

    fn scalar_kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Self::String(_) => ScalarKind::String,
            Self::Integer(_) => ScalarKind::Integer,
            Self::Timestamp(_) => ScalarKind::Timestamp,
            Self::Enum(_) => ScalarKind::Enum,
            Self::List(_) => return None,
        };
        Some(kind)
    }

    /// Checks the value against a declared kind.
    pub(in crate::request) fn conforms_to(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (Self::List(items), ValueKind::List(element)) => items
                .iter()
                .all(|item| item.scalar_kind() == Some(element)),
            (_, ValueKind::Scalar(expected)) => self.scalar_kind() == Some(expected),
            _ => false,
        }
    }

    /// An empty string or a list without element: nothing would reach the wire.
    pub(in crate::request) fn is_empty_value(&self) -> bool {
        match self {
            Self::String(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Integer(_) | Self::Timestamp(_) | Self::Enum(_) => false,
        }
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<Timestamp> for ParameterValue {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl<T> From<Vec<T>> for ParameterValue
where
    T: Into<ParameterValue>,
{
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

/// The set of values provided for one call, keyed by wire name.
///
/// Built by value: each `with*` call consumes the set and returns the
/// extended one, so a finished set is never shared with a builder.
///
/// ```rust
/// use requestgen_core::ParameterValues;
///
/// let values = ParameterValues::new()
///     .with("a", "BTC")
///     .with("metric", "active_count")
///     .with_opt("s", None::<i64>);
///
/// assert_eq!(values.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterValues {
    values: IndexMap<String, ParameterValue>,
}

impl ParameterValues {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous value with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets a value only when present.
    #[must_use]
    pub fn with_opt<V>(self, name: impl Into<String>, value: Option<V>) -> Self
    where
        V: Into<ParameterValue>,
    {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Looks up a value by wire name.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Number of provided values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was provided.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(in crate::request) fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterValues
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { values }
    }
}
