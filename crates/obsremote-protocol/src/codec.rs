//! Codec trait and implementations for envelope serialization.
//!
//! A codec converts between envelope types and the text carried in a
//! transport frame. The protocol layer doesn't care which serializer is
//! in use — anything implementing [`Codec`] will do, which keeps tests
//! free to substitute their own and leaves room for alternative wire
//! encodings without touching the session engine.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes envelopes to frame text and decodes frame text back.
///
/// `Send + Sync + 'static` because the codec is shared with the read-loop
/// task, which may run on any runtime thread.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into frame text.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError>;

    /// Deserializes frame text back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the text is malformed or
    /// doesn't match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks the peer's JSON wire format.
///
/// This is the production codec: every frame on the wire is one JSON
/// object. Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use obsremote_protocol::{Codec, JsonCodec, RequestEnvelope};
///
/// let codec = JsonCodec;
/// let req = RequestEnvelope::new("GetVersion", "1");
/// let text = codec.encode(&req).unwrap();
/// assert!(text.contains(r#""request-type":"GetVersion""#));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
