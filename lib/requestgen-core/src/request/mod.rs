//! Request descriptors, parameter serialization, URL templates, execution
//! and envelope decoding.

mod descriptor;
pub use self::descriptor::{ParamLocation, ParameterDescriptor, ScalarKind, ValueKind};

mod value;
pub use self::value::{ParameterValue, ParameterValues, WireEnum};

mod params;
pub use self::params::{CanonicalParams, SerializedParameters, WireScalar, WireValue};

mod template;
pub use self::template::UrlTemplate;

mod envelope;
pub use self::envelope::{DataPath, decode_response};

mod spec;
pub use self::spec::{BodyFormat, Endpoint, RequestSpec, RequestSpecBuilder};

mod transport;
pub use self::transport::{
    AuthenticatedRequest, AuthenticatedTransport, RequestBody, TransportResponse,
};

mod executor;
pub use self::executor::RequestExecutor;

mod error;
pub use self::error::{
    DecodeError, DecodeStage, RequestError, SpecError, TransportError, ValidationError,
};
