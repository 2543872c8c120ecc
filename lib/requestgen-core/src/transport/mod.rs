//! Transport adapters.

mod reqwest_transport;
pub use self::reqwest_transport::{
    CallContext, ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportError,
};
