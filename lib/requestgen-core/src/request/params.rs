//! Canonical parameter serialization.
//!
//! A [`ParameterValues`] set is validated against its descriptor set and
//! turned into one [`CanonicalParams`] map per location. The query-string,
//! form and JSON encoders all read from that single canonical map.

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use super::descriptor::{ParamLocation, ParameterDescriptor};
use super::error::ValidationError;
use super::value::{ParameterValue, ParameterValues};

/// Characters left as-is in query keys and values: RFC 3986 unreserved set.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Suffix appended to the key of every list element.
const LIST_SUFFIX: &str = "[]";

/// A scalar as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WireScalar {
    /// Textual value: strings, enum names and millisecond timestamps.
    Text(String),
    /// Integer value.
    Integer(i64),
}

impl WireScalar {
    fn from_value(value: &ParameterValue) -> Option<Self> {
        let scalar = match value {
            ParameterValue::String(text) => Self::Text(text.clone()),
            ParameterValue::Integer(number) => Self::Integer(*number),
            ParameterValue::Timestamp(timestamp) => {
                Self::Text(timestamp.as_millisecond().to_string())
            }
            ParameterValue::Enum(name) => Self::Text(name.to_string()),
            ParameterValue::List(_) => return None,
        };
        Some(scalar)
    }

    /// Textual form used in query strings and URL paths.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(number) => number.to_string(),
        }
    }
}

/// A canonical parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    /// A single value.
    Scalar(WireScalar),
    /// An ordered sequence, expanded to repeated `key[]` pairs in query strings.
    List(Vec<WireScalar>),
}

impl WireValue {
    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::List(items) => items
                .iter()
                .map(WireScalar::from_value)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            scalar => WireScalar::from_value(scalar).map(Self::Scalar),
        }
    }
}

/// Ordered wire-key to value map for one parameter location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalParams(IndexMap<String, WireValue>);

impl CanonicalParams {
    /// Whether the map has no entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up an entry by wire key.
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.0.get(name)
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Appends every entry of `other`.
    pub(in crate::request) fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Key/value pairs with lists expanded into repeated `key[]` pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            match value {
                WireValue::Scalar(scalar) => pairs.push((name.clone(), scalar.to_text())),
                WireValue::List(items) => {
                    let key = [name.as_str(), LIST_SUFFIX].concat();
                    pairs.extend(items.iter().map(|item| (key.clone(), item.to_text())));
                }
            }
        }
        pairs
    }

    /// Percent-encoded query string, e.g. `a=BTC&tags[]=x&tags[]=y`.
    ///
    /// The `[]` list suffix is written verbatim.
    pub fn to_query_string(&self) -> String {
        let mut query = String::new();
        for (name, value) in &self.0 {
            let (key, items) = match value {
                WireValue::Scalar(scalar) => (encode(name), vec![scalar.to_text()]),
                WireValue::List(items) => (
                    [encode(name).as_str(), LIST_SUFFIX].concat(),
                    items.iter().map(WireScalar::to_text).collect(),
                ),
            };
            for item in items {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&key);
                query.push('=');
                query.push_str(&encode(&item));
            }
        }
        query
    }

    /// `application/x-www-form-urlencoded` body built from [`query_pairs`](Self::query_pairs).
    ///
    /// # Errors
    ///
    /// Propagates the `serde_urlencoded` error.
    pub fn to_form(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self.query_pairs())
    }

    /// JSON body: a flat object of the canonical map.
    ///
    /// # Errors
    ///
    /// Propagates the `serde_json` marshalling error.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, QUERY_COMPONENT).to_string()
}

/// Validated parameters split by location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializedParameters {
    query: CanonicalParams,
    body: CanonicalParams,
    slugs: IndexMap<String, String>,
}

impl SerializedParameters {
    /// Validates `values` against `descriptors` and encodes them.
    ///
    /// Required fields are checked first, in declaration order, so the error
    /// names the first missing one. Absent optional fields are omitted.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn build(
        descriptors: &[ParameterDescriptor],
        values: &ParameterValues,
    ) -> Result<Self, ValidationError> {
        for descriptor in descriptors.iter().filter(|desc| desc.is_required()) {
            let field = descriptor.name();
            match values.get(field) {
                None => {
                    return Err(ValidationError::MissingRequired {
                        field: field.to_string(),
                    });
                }
                Some(value) if value.is_empty_value() => {
                    return Err(ValidationError::EmptyRequired {
                        field: field.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = values
            .names()
            .find(|name| !descriptors.iter().any(|desc| desc.name() == *name))
        {
            return Err(ValidationError::Undeclared {
                field: unknown.to_string(),
            });
        }

        let mut result = Self::default();
        for descriptor in descriptors {
            let Some(value) = values.get(descriptor.name()) else {
                continue;
            };
            let wire = WireValue::from_value(value)
                .filter(|_| value.conforms_to(descriptor.kind()))
                .ok_or_else(|| ValidationError::KindMismatch {
                    field: descriptor.name().to_string(),
                    expected: descriptor.kind(),
                    found: value.variant_name(),
                })?;
            let name = descriptor.name().to_string();

            match descriptor.location() {
                ParamLocation::Query => {
                    result.query.0.insert(name, wire);
                }
                ParamLocation::Body => {
                    result.body.0.insert(name, wire);
                }
                ParamLocation::Slug => {
                    let text = match wire {
                        WireValue::Scalar(scalar) => scalar.to_text(),
                        WireValue::List(items) => items
                            .iter()
                            .map(WireScalar::to_text)
                            .collect::<Vec<_>>()
                            .join(","),
                    };
                    result.slugs.insert(name, text);
                }
            }
        }

        Ok(result)
    }

    /// Query-classified parameters.
    pub fn query(&self) -> &CanonicalParams {
        &self.query
    }

    /// Body-classified parameters.
    pub fn body(&self) -> &CanonicalParams {
        &self.body
    }

    /// Slug values as path text, keyed by placeholder name.
    pub fn slugs(&self) -> &IndexMap<String, String> {
        &self.slugs
    }

    pub(in crate::request) fn into_parts(
        self,
    ) -> (CanonicalParams, CanonicalParams, IndexMap<String, String>) {
        (self.query, self.body, self.slugs)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::request::descriptor::{ScalarKind, ValueKind};

    static DESCRIPTORS: &[ParameterDescriptor] = &[
        ParameterDescriptor::query("a", ValueKind::STRING).required(),
        ParameterDescriptor::query("s", ValueKind::TIMESTAMP),
        ParameterDescriptor::query("tags", ValueKind::List(ScalarKind::String)),
        ParameterDescriptor::body("limit", ValueKind::INTEGER),
        ParameterDescriptor::slug("metric", ValueKind::STRING),
    ];

    fn jan_first() -> Timestamp {
        "2021-01-01T00:00:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn should_serialize_timestamp_as_epoch_millis() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("s", jan_first())
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");

        assert_eq!(
            params.query().get("s"),
            Some(&WireValue::Scalar(WireScalar::Text(
                "1609459200000".to_string()
            )))
        );
    }

    #[test]
    fn should_expand_lists_with_bracket_suffix() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("tags", vec!["a", "b"])
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");

        insta::assert_snapshot!(params.query().to_query_string(), @"a=BTC&tags[]=a&tags[]=b");
    }

    #[test]
    fn should_fail_on_first_missing_required_field() {
        let values = ParameterValues::new().with("s", jan_first());

        let error = SerializedParameters::build(DESCRIPTORS, &values).expect_err("a is missing");

        assert_eq!(
            error,
            ValidationError::MissingRequired {
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn should_reject_empty_required_string() {
        let values = ParameterValues::new().with("a", "").with("metric", "price");

        let error = SerializedParameters::build(DESCRIPTORS, &values).expect_err("a is empty");

        insta::assert_snapshot!(error, @"a is required, empty value given");
    }

    #[test]
    fn should_reject_kind_mismatch() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("s", "yesterday")
            .with("metric", "price");

        let error = SerializedParameters::build(DESCRIPTORS, &values).expect_err("s is a string");

        insta::assert_snapshot!(error, @"s expects a timestamp value, got string");
    }

    #[test]
    fn should_reject_undeclared_parameter() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("metric", "price")
            .with("extra", 1);

        let error = SerializedParameters::build(DESCRIPTORS, &values).expect_err("extra");

        assert_eq!(error.field(), "extra");
    }

    #[test]
    fn should_omit_absent_optional_fields() {
        let values = ParameterValues::new().with("a", "BTC").with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");

        assert_eq!(params.query().iter().count(), 1);
        assert!(params.body().is_empty());
        assert_eq!(params.slugs().get("metric").map(String::as_str), Some("price"));
    }

    #[test]
    fn should_encode_body_as_flat_json() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("limit", 50)
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");
        let json = params.body().to_json().expect("valid json");

        insta::assert_snapshot!(String::from_utf8_lossy(&json), @r#"{"limit":50}"#);
    }

    #[test]
    fn should_reject_empty_required_list() {
        let descriptors = [
            ParameterDescriptor::query("symbols", ValueKind::List(ScalarKind::String)).required(),
        ];
        let values = ParameterValues::new().with("symbols", Vec::<String>::new());

        let error = SerializedParameters::build(&descriptors, &values)
            .expect_err("symbols has no element");

        assert_eq!(
            error,
            ValidationError::EmptyRequired {
                field: "symbols".to_string()
            }
        );
    }

    #[test]
    fn should_keep_empty_optional_list_off_the_wire() {
        let values = ParameterValues::new()
            .with("a", "BTC")
            .with("tags", Vec::<String>::new())
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");

        insta::assert_snapshot!(params.query().to_query_string(), @"a=BTC");
    }

    #[test]
    fn should_form_encode_lists_and_reserved_characters() {
        let values = ParameterValues::new()
            .with("a", "BTC & ETH")
            .with("tags", vec!["x y", "z"])
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");
        let form = params.query().to_form().expect("valid form");

        insta::assert_snapshot!(form, @"a=BTC+%26+ETH&tags%5B%5D=x+y&tags%5B%5D=z");
    }

    #[test]
    fn should_percent_encode_query_values() {
        let values = ParameterValues::new()
            .with("a", "BTC & ETH")
            .with("metric", "price");

        let params = SerializedParameters::build(DESCRIPTORS, &values).expect("valid");

        insta::assert_snapshot!(params.query().to_query_string(), @"a=BTC%20%26%20ETH");
    }
}
