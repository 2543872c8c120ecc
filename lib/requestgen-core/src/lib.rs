//! # Requestgen Core
//!
//! Typed, validated requests for authenticated REST APIs.
//!
//! A request type is described once by a [`RequestSpec`]: an HTTP method, a
//! URL template with `:name` placeholders, and a set of
//! [`ParameterDescriptor`]s classifying each parameter as query, body or slug.
//! Each call provides [`ParameterValues`]; the [`RequestExecutor`] validates
//! them, serializes them to the wire, resolves the URL, hands the request to
//! an [`AuthenticatedTransport`] and decodes the response, optionally reaching
//! into a nested envelope such as `Data.Data`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::LazyLock;
//!
//! use http::Method;
//! use http::uri::Scheme;
//! use requestgen_core::{
//!     CallContext, ParameterDescriptor, ParameterValues, RequestExecutor, RequestSpec,
//!     ReqwestTransport, ValueKind,
//! };
//! # use serde::Deserialize;
//! # #[derive(Debug, Deserialize)]
//! # struct Point { t: i64, v: i64 }
//!
//! static ADDRESSES: LazyLock<RequestSpec> = LazyLock::new(|| {
//!     RequestSpec::builder(Method::GET, "/v1/metrics/addresses/:metric")
//!         .param(ParameterDescriptor::query("a", ValueKind::STRING).required())
//!         .param(ParameterDescriptor::query("s", ValueKind::TIMESTAMP))
//!         .param(ParameterDescriptor::slug("metric", ValueKind::STRING))
//!         .build()
//!         .unwrap_or_else(|err| panic!("invalid addresses spec: {err}"))
//! });
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::builder()
//!     .with_scheme(Scheme::HTTP)
//!     .with_host("localhost")
//!     .with_port(8080)
//!     .with_header("X-Api-Key", "secret")?
//!     .build()?;
//! let executor = RequestExecutor::new(transport);
//!
//! let values = ParameterValues::new()
//!     .with("a", "BTC")
//!     .with("metric", "active_count");
//! let points: Vec<Point> = executor
//!     .execute(&CallContext::default(), &ADDRESSES, &values)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Serialization rules
//!
//! - Timestamps are sent as decimal milliseconds since the Unix epoch.
//! - Lists are repeated with a `[]` suffix in query strings (`tags[]=a&tags[]=b`)
//!   and become JSON arrays in JSON bodies.
//! - For `GET`, `HEAD` and `DELETE`, body parameters are appended to the query.
//! - Absent optional parameters are omitted everywhere.
//!
//! ## Features
//!
//! - `reqwest` (default): [`ReqwestTransport`], an unsigned transport over
//!   [`reqwest::Client`]. Signing transports implement
//!   [`AuthenticatedTransport`] themselves.
//!
//! No TLS backend is enabled on `reqwest`. To reach HTTPS hosts, enable one
//! (for instance reqwest's `rustls` feature) in your own manifest and pass the
//! configured client with [`ReqwestTransportBuilder::with_client`].

#![cfg_attr(docsrs, feature(doc_cfg))]

mod request;

pub use self::request::{
    AuthenticatedRequest, AuthenticatedTransport, BodyFormat, CanonicalParams, DataPath,
    DecodeError, DecodeStage, Endpoint, ParamLocation, ParameterDescriptor, ParameterValue,
    ParameterValues, RequestBody, RequestError, RequestExecutor, RequestSpec,
    RequestSpecBuilder, ScalarKind, SerializedParameters, SpecError, TransportError,
    TransportResponse, UrlTemplate, ValidationError, ValueKind, WireEnum, WireScalar, WireValue,
    decode_response,
};

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod transport;

#[cfg(feature = "reqwest")]
pub use self::transport::{
    CallContext, ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportError,
};
