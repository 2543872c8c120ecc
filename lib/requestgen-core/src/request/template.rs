use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::error::{RequestError, SpecError};

/// Characters left as-is in a path segment: RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// A URL path template parsed into literal segments and `:name` slots.
///
/// A slot name is the longest run of `[A-Za-z0-9_]` after the `:`, so
/// `:metric` and `:metricAlt` are distinct slots and never shadow each other.
///
/// Values are percent-encoded as one path segment rather than substituted
/// verbatim. Identifier values (`[A-Za-z0-9-._~]`) come out unchanged; any
/// other character, `/` included, is escaped so a value can never add a
/// path segment.
///
/// ```rust
/// use indexmap::IndexMap;
/// use requestgen_core::UrlTemplate;
///
/// let template = UrlTemplate::parse("/v1/metrics/addresses/:metric")?;
/// let slugs = IndexMap::from([("metric".to_string(), "price".to_string())]);
///
/// assert_eq!(template.resolve(&slugs)?, "/v1/metrics/addresses/price");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{raw}")]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Fails when a `:` is not followed by a placeholder name.
    pub fn parse(template: impl Into<String>) -> Result<Self, SpecError> {
        let raw = template.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            if ch != ':' {
                literal.push(ch);
                continue;
            }

            let mut name = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if !is_name_char(next) {
                    break;
                }
                name.push(next);
                chars.next();
            }
            if name.is_empty() {
                return Err(SpecError::InvalidTemplate {
                    template: raw.clone(),
                    position,
                });
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Slot(name));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { raw, segments })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance, repeats included.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every slot with its value.
    ///
    /// Values are percent-encoded as a single path segment; identifier-like
    /// values pass through unchanged.
    ///
    /// # Errors
    ///
    /// [`RequestError::UnresolvedSlug`] lists every slot without a value.
    pub fn resolve(&self, slugs: &IndexMap<String, String>) -> Result<String, RequestError> {
        let mut path = String::with_capacity(self.raw.len());
        let mut missing = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Slot(name) => match slugs.get(name) {
                    Some(value) => path.extend(utf8_percent_encode(value, SEGMENT)),
                    None => {
                        if !missing.contains(name) {
                            missing.push(name.clone());
                        }
                    }
                },
            }
        }

        if !missing.is_empty() {
            return Err(RequestError::UnresolvedSlug {
                template: self.raw.clone(),
                missing,
            });
        }

        Ok(path)
    }
}

impl TryFrom<&str> for UrlTemplate {
    type Error = SpecError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn should_resolve_single_slug() {
        let template = UrlTemplate::parse("/v1/metrics/addresses/:metric").expect("valid");

        let path = template
            .resolve(&slugs(&[("metric", "price")]))
            .expect("should resolve");

        assert_eq!(path, "/v1/metrics/addresses/price");
    }

    #[test]
    fn should_not_confuse_prefix_named_slots() {
        let template = UrlTemplate::parse("/v1/:metric/:metricAlt").expect("valid");

        let path = template
            .resolve(&slugs(&[("metricAlt", "alt"), ("metric", "price")]))
            .expect("should resolve");

        assert_eq!(path, "/v1/price/alt");
        assert_eq!(template.slots().collect::<Vec<_>>(), vec!["metric", "metricAlt"]);
    }

    #[test]
    fn should_report_unresolved_slot() {
        let template = UrlTemplate::parse("/v1/:metric/:metricAlt").expect("valid");

        let error = template
            .resolve(&slugs(&[("metricAlt", "alt")]))
            .expect_err("metric is missing");

        insta::assert_snapshot!(error, @r#"URL template '/v1/:metric/:metricAlt' has unresolved placeholders: ["metric"]"#);
    }

    #[test]
    fn should_resolve_repeated_slot() {
        let template = UrlTemplate::parse("/api/:version/users/:id/posts/:id").expect("valid");

        let path = template
            .resolve(&slugs(&[("version", "v1"), ("id", "456")]))
            .expect("should resolve");

        assert_eq!(path, "/api/v1/users/456/posts/456");
    }

    #[test]
    fn should_encode_values_as_one_segment() {
        let template = UrlTemplate::parse("/search/:query").expect("valid");

        let path = template
            .resolve(&slugs(&[("query", "a/b c")]))
            .expect("should resolve");

        insta::assert_snapshot!(path, @"/search/a%2Fb%20c");
    }

    #[test]
    fn should_pass_identifier_values_through() {
        let template = UrlTemplate::parse("/v1/metrics/:metric").expect("valid");

        let path = template
            .resolve(&slugs(&[("metric", "sopr_adjusted-v2.1~raw")]))
            .expect("should resolve");

        assert_eq!(path, "/v1/metrics/sopr_adjusted-v2.1~raw");
    }

    #[test]
    fn should_stop_slot_name_at_non_identifier() {
        let template = UrlTemplate::parse("/v1/:symbol.json").expect("valid");

        let path = template
            .resolve(&slugs(&[("symbol", "BTCUSDT")]))
            .expect("should resolve");

        assert_eq!(path, "/v1/BTCUSDT.json");
    }

    #[test]
    fn should_keep_template_without_slots() {
        let template = UrlTemplate::parse("/sapi/v1/rebate/taxQuery").expect("valid");

        assert_eq!(template.slots().count(), 0);
        assert_eq!(
            template.resolve(&IndexMap::new()).expect("no slot"),
            "/sapi/v1/rebate/taxQuery"
        );
    }

    #[test]
    fn should_reject_dangling_colon() {
        let error = UrlTemplate::parse("/v1/:/x").expect_err("empty placeholder");

        insta::assert_snapshot!(error, @"invalid URL template '/v1/:/x': empty placeholder at byte 4");
    }
}
