//! Error types for the session layer.

/// Errors that can occur in the session engine.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The digest provider could not compute a hash. The negotiator has
    /// no failure mode of its own; this is always a propagated provider
    /// failure (e.g. a host without the required crypto capability).
    #[error("digest provider failed: {0}")]
    Digest(String),

    /// `authenticate` was called without stored challenge material.
    /// Challenge material arrives with the auth-requirement query and is
    /// consumed by each attempt, so a retry must query again first.
    #[error("no challenge material; query the auth requirement first")]
    MissingChallenge,

    /// The connection went away before the response arrived. Pending
    /// requests are dropped undelivered on close; this is what the
    /// awaiting caller sees instead of a response.
    #[error("connection closed before the response arrived")]
    ConnectionLost,
}
