#![allow(dead_code)]

//! Fetches an address metric from a glassnode-compatible API.
//!
//! ```shell
//! API_HOST=localhost API_PORT=8080 API_KEY=secret \
//!     cargo run --example glassnode_addresses -- active_count BTC
//! ```
//!
//! The crate enables no TLS backend; for HTTPS hosts, enable one on
//! `reqwest` in your own manifest and pass the client with `with_client`.

use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use http::Method;
use http::uri::Scheme;
use serde::Deserialize;
use tracing::info;

use requestgen_core::{
    CallContext, Endpoint, ParameterDescriptor, ParameterValue, ParameterValues, RequestExecutor,
    RequestSpec, ReqwestTransport, ValueKind, WireEnum,
};

#[derive(Debug, Clone, Copy)]
enum Interval {
    Hour,
    Day,
}

impl WireEnum for Interval {
    fn wire_name(&self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
        }
    }
}

static ADDRESSES: LazyLock<RequestSpec> = LazyLock::new(|| {
    RequestSpec::builder(Method::GET, "/v1/metrics/addresses/:metric")
        .param(ParameterDescriptor::query("a", ValueKind::STRING).required())
        .param(ParameterDescriptor::query("s", ValueKind::INTEGER))
        .param(ParameterDescriptor::query("u", ValueKind::INTEGER))
        .param(ParameterDescriptor::query("i", ValueKind::ENUM))
        .param(ParameterDescriptor::slug("metric", ValueKind::STRING))
        .build()
        .unwrap_or_else(|err| panic!("invalid addresses spec: {err}"))
});

#[derive(Debug, Deserialize)]
struct DataPoint {
    t: i64,
    v: f64,
}

struct AddressesRequest {
    asset: String,
    metric: String,
    since: Option<i64>,
    interval: Option<Interval>,
}

impl Endpoint for AddressesRequest {
    type Output = Vec<DataPoint>;

    fn spec(&self) -> &RequestSpec {
        &ADDRESSES
    }

    fn parameters(&self) -> ParameterValues {
        ParameterValues::new()
            .with("a", self.asset.as_str())
            .with_opt("s", self.since)
            .with_opt("i", self.interval.map(ParameterValue::enumeration))
            .with("metric", self.metric.as_str())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let host = env::var("API_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("API_PORT")
        .ok()
        .map(|port| port.parse::<u16>())
        .transpose()
        .context("API_PORT must be a port number")?
        .unwrap_or(80);
    let api_key = env::var("API_KEY").context("API_KEY is required")?;

    let mut args = env::args().skip(1);
    let metric = args.next().unwrap_or_else(|| "active_count".to_string());
    let asset = args.next().unwrap_or_else(|| "BTC".to_string());

    let transport = ReqwestTransport::builder()
        .with_scheme(Scheme::HTTP)
        .with_host(host)
        .with_port(port)
        .with_header("X-Api-Key", &api_key)?
        .with_timeout(Duration::from_secs(30))
        .build()?;
    let executor = RequestExecutor::new(transport);

    let request = AddressesRequest {
        asset,
        metric,
        since: None,
        interval: Some(Interval::Day),
    };
    let points = executor.call(&CallContext::default(), &request).await?;

    info!(count = points.len(), last = ?points.last(), "fetched data points");
    Ok(())
}
