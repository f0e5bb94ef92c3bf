//! Unified error type for the obsremote client.

use obsremote_protocol::ProtocolError;
use obsremote_session::SessionError;
use obsremote_transport::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// When using the `obsremote` crate, callers deal with this single type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes auto-generate `From` impls so `?` converts layer errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum ObsRemoteError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (digest, challenge, lost connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A request was issued while no connection is open.
    ///
    /// The historical client silently swallowed such sends; an awaiting
    /// caller can't be left hanging, so this surfaces explicitly.
    #[error("not connected")]
    NotConnected,

    /// The peer answered a request with `status: "error"`.
    #[error("request `{request_type}` failed: {message}")]
    RequestFailed {
        request_type: String,
        message: String,
    },

    /// The authentication attempt was rejected.
    #[error("authentication failed ({remaining_attempts} attempts remaining)")]
    AuthenticationFailed { remaining_attempts: u32 },
}
