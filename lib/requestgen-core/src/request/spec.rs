use std::collections::HashSet;

use http::Method;
use serde::de::DeserializeOwned;

use super::descriptor::{ParamLocation, ParameterDescriptor};
use super::envelope::DataPath;
use super::error::{RequestError, SpecError, ValidationError};
use super::params::SerializedParameters;
use super::template::UrlTemplate;
use super::transport::{AuthenticatedRequest, RequestBody};
use super::value::ParameterValues;

/// Encoding of body-classified parameters for methods that carry a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyFormat {
    /// Flat JSON object, `application/json`.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`, lists expanded as in query strings.
    Form,
}

/// Immutable definition of one request type.
///
/// Built once, typically in a `static` [`LazyLock`](std::sync::LazyLock),
/// and shared by every call.
///
/// ```rust
/// use http::Method;
/// use requestgen_core::{ParameterDescriptor, ParameterValues, RequestSpec, ValueKind};
///
/// let spec = RequestSpec::builder(Method::GET, "/v1/metrics/addresses/:metric")
///     .param(ParameterDescriptor::query("a", ValueKind::STRING).required())
///     .param(ParameterDescriptor::slug("metric", ValueKind::STRING))
///     .build()?;
///
/// let request = spec.prepare(&ParameterValues::new().with("a", "BTC").with("metric", "count"))?;
/// assert_eq!(request.path_and_query(), "/v1/metrics/addresses/count?a=BTC");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    template: UrlTemplate,
    descriptors: Vec<ParameterDescriptor>,
    data_path: Option<DataPath>,
    body_format: BodyFormat,
}

impl RequestSpec {
    /// Starts a definition for `method` and a `:name` URL template.
    pub fn builder(method: Method, template: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            method,
            template: template.into(),
            descriptors: Vec::new(),
            data_path: None,
            body_format: BodyFormat::default(),
        }
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL template.
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Path to the payload inside the response envelope.
    pub fn data_path(&self) -> Option<&DataPath> {
        self.data_path.as_ref()
    }

    /// Encoding used for body parameters.
    pub fn body_format(&self) -> BodyFormat {
        self.body_format
    }

    fn carries_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::DELETE)
    }

    /// Validates and encodes `values` without resolving the URL.
    ///
    /// # Errors
    ///
    /// See [`SerializedParameters::build`].
    pub fn serialize(
        &self,
        values: &ParameterValues,
    ) -> Result<SerializedParameters, ValidationError> {
        SerializedParameters::build(&self.descriptors, values)
    }

    /// Builds the request to hand to the transport.
    ///
    /// For `GET`, `HEAD` and `DELETE` the body parameters are appended to the
    /// query string; other methods send them as the body.
    ///
    /// # Errors
    ///
    /// Validation, slug resolution and body encoding errors. Nothing is sent.
    pub fn prepare(&self, values: &ParameterValues) -> Result<AuthenticatedRequest, RequestError> {
        let (mut query, body_params, slugs) = self.serialize(values)?.into_parts();
        let path = self.template.resolve(&slugs)?;

        let body = if !self.carries_body() {
            query.extend(body_params);
            None
        } else if body_params.is_empty() {
            None
        } else {
            let body = match self.body_format {
                BodyFormat::Json => {
                    RequestBody::new(mime::APPLICATION_JSON, body_params.to_json()?)
                }
                BodyFormat::Form => RequestBody::new(
                    mime::APPLICATION_WWW_FORM_URLENCODED,
                    body_params.to_form()?,
                ),
            };
            Some(body)
        };

        Ok(AuthenticatedRequest {
            method: self.method.clone(),
            path,
            query,
            body,
        })
    }
}

/// Builder for [`RequestSpec`]; every method consumes and returns the builder.
#[derive(Debug, Clone)]
pub struct RequestSpecBuilder {
    method: Method,
    template: String,
    descriptors: Vec<ParameterDescriptor>,
    data_path: Option<String>,
    body_format: BodyFormat,
}

impl RequestSpecBuilder {
    /// Appends a descriptor.
    #[must_use]
    pub fn param(mut self, descriptor: ParameterDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Appends several descriptors, keeping their order.
    #[must_use]
    pub fn params(mut self, descriptors: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Sets the dot-separated path of the payload in the response envelope.
    #[must_use]
    pub fn data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Sets the body encoding.
    #[must_use]
    pub fn body_format(mut self, format: BodyFormat) -> Self {
        self.body_format = format;
        self
    }

    /// Checks the definition and builds the [`RequestSpec`].
    ///
    /// # Errors
    ///
    /// A [`SpecError`] when the template is malformed, names repeat, template
    /// placeholders and slug descriptors disagree, or the data path is empty.
    pub fn build(self) -> Result<RequestSpec, SpecError> {
        let Self {
            method,
            template,
            descriptors,
            data_path,
            body_format,
        } = self;

        let template = UrlTemplate::parse(template)?;

        let mut names = HashSet::new();
        if let Some(duplicate) = descriptors.iter().find(|desc| !names.insert(desc.name())) {
            return Err(SpecError::DuplicateParameter {
                name: duplicate.name().to_string(),
            });
        }

        let slug_names: HashSet<&str> = descriptors
            .iter()
            .filter(|desc| desc.location() == ParamLocation::Slug)
            .map(|desc| desc.name())
            .collect();
        let slot_names: HashSet<&str> = template.slots().collect();

        if let Some(slot) = template.slots().find(|slot| !slug_names.contains(slot)) {
            return Err(SpecError::UndeclaredSlug {
                template: template.to_string(),
                slug: slot.to_string(),
            });
        }
        if let Some(slug) = descriptors
            .iter()
            .map(ParameterDescriptor::name)
            .find(|name| slug_names.contains(name) && !slot_names.contains(name))
        {
            return Err(SpecError::UnusedSlug {
                template: template.to_string(),
                slug: slug.to_string(),
            });
        }

        let data_path = data_path.map(DataPath::parse).transpose()?;

        Ok(RequestSpec {
            method,
            template,
            descriptors,
            data_path,
            body_format,
        })
    }
}

/// A concrete request type: its static spec, its values and its output type.
///
/// ```rust
/// use std::sync::LazyLock;
///
/// use http::Method;
/// use requestgen_core::{Endpoint, ParameterDescriptor, ParameterValues, RequestSpec, ValueKind};
///
/// static SPEC: LazyLock<RequestSpec> = LazyLock::new(|| {
///     RequestSpec::builder(Method::GET, "/v1/ping")
///         .param(ParameterDescriptor::query("echo", ValueKind::STRING))
///         .build()
///         .unwrap_or_else(|err| panic!("invalid ping spec: {err}"))
/// });
///
/// struct Ping { echo: Option<String> }
///
/// impl Endpoint for Ping {
///     type Output = serde_json::Value;
///
///     fn spec(&self) -> &RequestSpec {
///         &SPEC
///     }
///
///     fn parameters(&self) -> ParameterValues {
///         ParameterValues::new().with_opt("echo", self.echo.clone())
///     }
/// }
/// ```
pub trait Endpoint {
    /// Decoded result: the envelope, or the payload under the data path.
    type Output: DeserializeOwned;

    /// The shared definition of this request type.
    fn spec(&self) -> &RequestSpec;

    /// Values for this call.
    fn parameters(&self) -> ParameterValues;
}
