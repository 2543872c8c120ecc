#![allow(
    clippy::missing_errors_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex};

use http::{Method, StatusCode};
use jiff::Timestamp;
use rstest::fixture;
use serde::Deserialize;
use tracing::info;

use requestgen_core::{
    AuthenticatedRequest, AuthenticatedTransport, Endpoint, ParameterDescriptor, ParameterValue,
    ParameterValues, RequestSpec, ScalarKind, ValueKind, WireEnum,
};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("stub transport is offline")]
pub struct Offline;

/// In-memory transport answering every request with a canned body.
#[derive(Debug)]
pub struct StubTransport {
    body: String,
    offline: bool,
    sent: AtomicUsize,
    requests: Mutex<Vec<AuthenticatedRequest>>,
}

impl StubTransport {
    pub fn answering(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            offline: false,
            sent: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::answering("")
        }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AuthenticatedRequest> {
        self.requests.lock().expect("not poisoned").clone()
    }
}

impl AuthenticatedTransport for StubTransport {
    type Context = ();
    type Request = AuthenticatedRequest;
    type Error = Offline;

    fn build(
        &self,
        _context: &(),
        request: AuthenticatedRequest,
    ) -> Result<Self::Request, Offline> {
        Ok(request)
    }

    async fn send(
        &self,
        request: AuthenticatedRequest,
    ) -> Result<requestgen_core::TransportResponse, Offline> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("not poisoned").push(request);
        if self.offline {
            return Err(Offline);
        }
        Ok(requestgen_core::TransportResponse::new(
            StatusCode::OK,
            self.body.clone(),
        ))
    }
}

#[fixture]
pub fn offline_transport() -> StubTransport {
    init_tracing();
    StubTransport::offline()
}

// Glassnode-style metric request

#[derive(Debug, Clone, Copy)]
pub enum Interval {
    Hour,
    Day,
    Week,
}

impl WireEnum for Interval {
    fn wire_name(&self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
            Self::Week => "1w",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Format {
    Json,
    Csv,
}

impl WireEnum for Format {
    fn wire_name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
        }
    }
}

static ADDRESSES: LazyLock<RequestSpec> = LazyLock::new(|| {
    RequestSpec::builder(Method::GET, "/v1/metrics/addresses/:metric")
        .param(ParameterDescriptor::query("a", ValueKind::STRING).required())
        .param(ParameterDescriptor::query("s", ValueKind::INTEGER))
        .param(ParameterDescriptor::query("u", ValueKind::INTEGER))
        .param(ParameterDescriptor::query("i", ValueKind::ENUM))
        .param(ParameterDescriptor::query("f", ValueKind::ENUM))
        .param(ParameterDescriptor::query("timestamp_format", ValueKind::STRING))
        .param(ParameterDescriptor::slug("metric", ValueKind::STRING))
        .build()
        .expect("valid addresses spec")
});

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPoint {
    pub t: i64,
    pub v: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AddressesRequest {
    pub asset: String,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub interval: Option<Interval>,
    pub format: Option<Format>,
    pub timestamp_format: Option<String>,
    pub metric: String,
}

impl AddressesRequest {
    pub fn new(asset: &str, metric: &str) -> Self {
        Self {
            asset: asset.to_string(),
            metric: metric.to_string(),
            ..Self::default()
        }
    }
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
            .with_opt("u", self.until)
            .with_opt("i", self.interval.map(ParameterValue::enumeration))
            .with_opt("f", self.format.map(ParameterValue::enumeration))
            .with_opt("timestamp_format", self.timestamp_format.clone())
            .with("metric", self.metric.as_str())
    }
}

// Binance-style paged rebate history

static SPOT_REBATE_HISTORY: LazyLock<RequestSpec> = LazyLock::new(|| {
    RequestSpec::builder(Method::GET, "/sapi/v1/rebate/taxQuery")
        .param(ParameterDescriptor::body("startTime", ValueKind::TIMESTAMP))
        .param(ParameterDescriptor::body("endTime", ValueKind::TIMESTAMP))
        .data_path("Data.Data")
        .build()
        .expect("valid rebate spec")
});

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRebate {
    pub asset: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub amount: String,
    pub update_time: i64,
}

#[derive(Debug, Clone, Default)]
pub struct GetSpotRebateHistoryRequest {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl Endpoint for GetSpotRebateHistoryRequest {
    type Output = Vec<SpotRebate>;

    fn spec(&self) -> &RequestSpec {
        &SPOT_REBATE_HISTORY
    }

    fn parameters(&self) -> ParameterValues {
        ParameterValues::new()
            .with_opt("startTime", self.start_time)
            .with_opt("endTime", self.end_time)
    }
}

// Generic filter request exercising lists and bodies

pub fn order_filter_spec(method: Method) -> RequestSpec {
    RequestSpec::builder(method, "/api/v3/orders/:symbol")
        .param(ParameterDescriptor::slug("symbol", ValueKind::STRING))
        .param(ParameterDescriptor::query("recvWindow", ValueKind::INTEGER))
        .param(ParameterDescriptor::body("side", ValueKind::ENUM).required())
        .param(ParameterDescriptor::body("since", ValueKind::TIMESTAMP))
        .param(ParameterDescriptor::body("tags", ValueKind::List(ScalarKind::String)))
        .param(ParameterDescriptor::body("ids", ValueKind::List(ScalarKind::Integer)))
        .build()
        .expect("valid order filter spec")
}
