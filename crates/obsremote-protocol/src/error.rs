//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// `#[derive(thiserror::Error)]` auto-generates the `std::error::Error`
/// implementation; the `#[error("...")]` attributes define what shows up
/// in logs when a frame cannot be understood.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an envelope into wire text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning wire text into an envelope).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level.
    ///
    /// This is for frames that parse as JSON but violate protocol rules,
    /// e.g. a response whose expected payload field is absent.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
