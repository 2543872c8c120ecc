use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::uri::{PathAndQuery, Scheme};
use reqwest::{Body, Request};
use tracing::debug;
use url::Url;

use crate::request::{AuthenticatedRequest, AuthenticatedTransport, TransportResponse};

const BODY_MAX_LENGTH: usize = 1024;

/// Per-call settings passed through the executor to [`ReqwestTransport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Deadline for the whole exchange; `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl CallContext {
    /// A context with a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Errors raised by [`ReqwestTransport`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ReqwestTransportError {
    /// HTTP client error from reqwest.
    ReqwestError(reqwest::Error),

    /// The base URL or the joined request URL is invalid.
    UrlError(url::ParseError),

    /// A default header name is invalid.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// A default header value is invalid.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The base path cannot be used as a URL path.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Why the base path was rejected.
        error: String,
    },

    /// The server answered with a non-success status.
    #[display("Unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatus {
        /// The HTTP status code.
        status_code: u16,
        /// The response body, truncated.
        body: String,
    },
}

/// Unsigned [`AuthenticatedTransport`] over a [`reqwest::Client`].
///
/// Joins the resolved request path to a base URL, applies default headers and
/// the per-call timeout. Signing schemes wrap or replace this transport.
///
/// The crate enables no TLS backend; HTTPS needs a client built with one,
/// passed through [`ReqwestTransportBuilder::with_client`].
///
/// ```rust
/// use http::uri::Scheme;
/// use requestgen_core::{RequestExecutor, ReqwestTransport};
///
/// let transport = ReqwestTransport::builder()
///     .with_scheme(Scheme::HTTP)
///     .with_host("localhost")
///     .with_port(8080)
///     .with_header("X-Api-Key", "secret")?
///     .build()?;
/// let executor = RequestExecutor::new(transport);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Starts a builder with the defaults `http://127.0.0.1:80/`.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// The base URL every request path is joined to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, request: &AuthenticatedRequest) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            request.path().trim_start_matches('/')
        );
        url.set_path(&path);

        let query = request.query_string();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query));
        }
        url
    }
}

impl AuthenticatedTransport for ReqwestTransport {
    type Context = CallContext;
    type Request = Request;
    type Error = ReqwestTransportError;

    fn build(
        &self,
        context: &CallContext,
        request: AuthenticatedRequest,
    ) -> Result<Request, ReqwestTransportError> {
        let url = self.build_url(&request);
        let mut result = Request::new(request.method().clone(), url);

        let headers = result.headers_mut();
        headers.extend(self.headers.clone());

        if let Some(body) = request.body() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_str(body.content_type().as_ref())?,
            );
            *result.body_mut() = Some(Body::from(body.data().clone()));
        }
        *result.timeout_mut() = context.timeout.or(self.timeout);

        Ok(result)
    }

    async fn send(&self, request: Request) -> Result<TransportResponse, ReqwestTransportError> {
        debug!(?request, "sending...");
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let body = if text.len() > BODY_MAX_LENGTH {
                let cut = (0..=BODY_MAX_LENGTH)
                    .rev()
                    .find(|index| text.is_char_boundary(*index))
                    .unwrap_or_default();
                format!("{}... (truncated)", text.get(..cut).unwrap_or_default())
            } else {
                text.into_owned()
            };
            return Err(ReqwestTransportError::UnexpectedStatus {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(TransportResponse::new(status, body))
    }
}

/// Builder for [`ReqwestTransport`].
///
/// Defaults: scheme `http`, host `127.0.0.1`, port 80, no base path,
/// no default header, no timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
    client: reqwest::Client,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ReqwestTransportBuilder {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Fails when scheme, host, port and base path do not form a valid URL.
    pub fn build(self) -> Result<ReqwestTransport, ReqwestTransportError> {
        let Self {
            client,
            scheme,
            host,
            port,
            base_path,
            headers,
            timeout,
        } = self;

        let path = base_path
            .as_ref()
            .map_or("/", PathAndQuery::path);
        let base_url = Url::parse(&format!("{scheme}://{host}:{port}{path}"))?;

        Ok(ReqwestTransport {
            client,
            base_url,
            headers,
            timeout,
        })
    }

    /// Uses a preconfigured reqwest client (TLS, proxies, pool settings).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Default deadline, used when the [`CallContext`] has none.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a path prefix for every request, e.g. `/api`.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a valid URL path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, ReqwestTransportError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| ReqwestTransportError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    pub fn with_header(
        mut self,
        name: &str,
        value: &str,
    ) -> Result<Self, ReqwestTransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: Scheme::HTTP,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST).to_string(),
            port: 80,
            base_path: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }
}
