use serde::de::DeserializeOwned;
use tracing::debug;

use super::envelope::decode_response;
use super::error::{RequestError, TransportError};
use super::spec::{Endpoint, RequestSpec};
use super::transport::AuthenticatedTransport;
use super::value::ParameterValues;

/// Runs requests through an [`AuthenticatedTransport`] and decodes the results.
///
/// The executor keeps no state besides the transport, so one instance can
/// serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct RequestExecutor<T> {
    transport: T,
}

impl<T> RequestExecutor<T>
where
    T: AuthenticatedTransport,
{
    /// Wraps a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Prepares, sends and decodes one request.
    ///
    /// Validation and slug failures abort before the transport is reached.
    /// Transport failures are returned as-is; decode failures carry their stage.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub async fn execute<R>(
        &self,
        context: &T::Context,
        spec: &RequestSpec,
        values: &ParameterValues,
    ) -> Result<R, RequestError>
    where
        R: DeserializeOwned,
    {
        let request = spec.prepare(values)?;
        debug!(method = %request.method(), path = %request.path(), "sending...");

        let request = self
            .transport
            .build(context, request)
            .map_err(TransportError::new)?;
        let response = self
            .transport
            .send(request)
            .await
            .map_err(TransportError::new)?;
        debug!(status = %response.status(), "...receiving");

        let result = decode_response(response.body(), spec.data_path())?;
        Ok(result)
    }

    /// Executes an [`Endpoint`].
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub async fn call<E>(
        &self,
        context: &T::Context,
        endpoint: &E,
    ) -> Result<E::Output, RequestError>
    where
        E: Endpoint,
    {
        self.execute(context, endpoint.spec(), &endpoint.parameters()).await
    }
}
