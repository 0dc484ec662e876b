//! Payload codec seam.
//!
//! The dispatcher never talks to a serialization library directly. It goes
//! through [`PayloadCodec`], which decodes raw request bytes into a handler's
//! payload type and turns handler results into the codec's value type. The
//! transport later calls [`PayloadCodec::encode`] to produce the wire bytes.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error produced by a [`PayloadCodec`].
#[derive(Debug)]
pub enum CodecError {
    /// JSON decode or encode failure, message passed through from serde_json
    Json(serde_json::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Json(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Json(err) => std::error::Error::source(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err)
    }
}

/// Decode/encode capability injected into the dispatcher.
pub trait PayloadCodec: Send + Sync + 'static {
    /// In-memory representation of a handler result.
    type Value: fmt::Debug + Clone + Send + 'static;

    /// Decode raw payload bytes into a fresh `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// Convert a handler result into the codec's value type.
    fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Self::Value, CodecError>;

    /// Serialize a value for the wire.
    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    /// Content type the transport should advertise for encoded values.
    fn content_type(&self) -> &'static str;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    type Value = serde_json::Value;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Self::Value, CodecError> {
        Ok(serde_json::to_value(value)?)
    }

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
