use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{DecodeError, SpecError};

/// Dot-separated path to the payload inside a response envelope, e.g. `Data.Data`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{raw}")]
pub struct DataPath {
    raw: String,
    segments: Vec<String>,
}

impl DataPath {
    /// Parses a dot-separated path.
    ///
    /// # Errors
    ///
    /// Fails on an empty path or an empty segment.
    pub fn parse(path: impl Into<String>) -> Result<Self, SpecError> {
        let raw = path.into();
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SpecError::InvalidDataPath { path: raw });
        }
        Ok(Self { raw, segments })
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks the envelope and returns the value at the end of the path.
    fn extract(&self, envelope: serde_json::Value) -> Result<serde_json::Value, DecodeError> {
        let mut current = envelope;
        let mut walked = String::new();

        for segment in &self.segments {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);

            let serde_json::Value::Object(mut object) = current else {
                return Err(DecodeError::NotAnObject { segment: walked });
            };
            current = object
                .remove(segment)
                .ok_or_else(|| DecodeError::MissingSegment {
                    segment: walked.clone(),
                })?;
        }

        Ok(current)
    }
}

/// Decodes a response body, drilling into `data_path` when set.
///
/// Without a data path the whole body is decoded as `T`.
///
/// # Errors
///
/// Returns a [`DecodeError`] tagged with the failing stage.
pub fn decode_response<T>(body: &[u8], data_path: Option<&DataPath>) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    let Some(data_path) = data_path else {
        let deserializer = &mut serde_json::Deserializer::from_slice(body);
        return serde_path_to_error::deserialize(deserializer).map_err(|err| {
            DecodeError::Envelope {
                path: err.path().to_string(),
                error: err.into_inner(),
            }
        });
    };

    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    let envelope: serde_json::Value =
        serde_path_to_error::deserialize(deserializer).map_err(|err| DecodeError::Envelope {
            path: err.path().to_string(),
            error: err.into_inner(),
        })?;

    let payload = data_path.extract(envelope)?;
    debug!(%data_path, "extracted nested payload");

    serde_path_to_error::deserialize(payload).map_err(|err| DecodeError::Payload {
        segment: data_path.to_string(),
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}
