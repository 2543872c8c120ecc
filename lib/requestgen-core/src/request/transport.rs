use std::future::Future;

use bytes::Bytes;
use http::{Method, StatusCode};

use super::params::CanonicalParams;

/// Encoded request body with its content type.
#[derive(Clone, derive_more::Debug)]
pub struct RequestBody {
    content_type: mime::Mime,
    #[debug(ignore)]
    data: Bytes,
}

impl RequestBody {
    pub(in crate::request) fn new(content_type: mime::Mime, data: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// Content type of the body.
    pub fn content_type(&self) -> &mime::Mime {
        &self.content_type
    }

    /// Encoded body bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// A fully validated request, ready to be signed and sent.
///
/// Produced by [`RequestSpec::prepare`](super::RequestSpec::prepare) and
/// consumed once by the transport.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub(in crate::request) method: Method,
    pub(in crate::request) path: String,
    pub(in crate::request) query: CanonicalParams,
    pub(in crate::request) body: Option<RequestBody>,
}

impl AuthenticatedRequest {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path with every slug resolved, relative to the API base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical query parameters.
    pub fn query(&self) -> &CanonicalParams {
        &self.query
    }

    /// Percent-encoded query string, empty when there is no query parameter.
    pub fn query_string(&self) -> String {
        self.query.to_query_string()
    }

    /// Path followed by `?query` when the query is not empty.
    pub fn path_and_query(&self) -> String {
        let query = self.query.to_query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }

    /// Encoded body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

/// Raw response handed back by the transport.
#[derive(Clone, derive_more::Debug)]
pub struct TransportResponse {
    status: StatusCode,
    #[debug(ignore)]
    body: Bytes,
}

impl TransportResponse {
    /// Creates a response from a status and a raw body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// The collaborator that signs, sends and receives HTTP requests.
///
/// The executor never retries, throttles or signs: all of that belongs here.
/// Implementations must report non-success statuses as errors and must be
/// safe to share between concurrent calls.
///
/// `Context` carries caller-supplied cancellation or deadline information;
/// the executor passes it through untouched.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
///
/// use http::StatusCode;
/// use requestgen_core::{AuthenticatedRequest, AuthenticatedTransport, TransportResponse};
///
/// struct Canned(&'static str);
///
/// impl AuthenticatedTransport for Canned {
///     type Context = ();
///     type Request = AuthenticatedRequest;
///     type Error = Infallible;
///
///     fn build(
///         &self,
///         _: &(),
///         request: AuthenticatedRequest,
///     ) -> Result<Self::Request, Infallible> {
///         Ok(request)
///     }
///
///     async fn send(&self, _: AuthenticatedRequest) -> Result<TransportResponse, Infallible> {
///         Ok(TransportResponse::new(StatusCode::OK, self.0))
///     }
/// }
/// ```
pub trait AuthenticatedTransport: Send + Sync {
    /// Opaque per-call context (deadline, cancellation).
    type Context: Send + Sync;
    /// Transport-specific signed request.
    type Request: Send;
    /// Transport failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds and signs a transport request.
    ///
    /// # Errors
    ///
    /// Fails when the request cannot be built or signed.
    fn build(
        &self,
        context: &Self::Context,
        request: AuthenticatedRequest,
    ) -> Result<Self::Request, Self::Error>;

    /// Sends a built request and returns the raw response.
    fn send(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Result<TransportResponse, Self::Error>> + Send;
}
