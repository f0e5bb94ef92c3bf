//! Session engine for obsremote: correlation, state, and authentication.
//!
//! This crate owns the stateful pieces that sit between the protocol
//! types and the client surface:
//!
//! 1. **Request correlation** — every outbound request gets a fresh
//!    identifier and a slot where its eventual response lands
//!    ([`RequestCorrelator`]).
//! 2. **Session state** — the connect → authenticate → ready lifecycle
//!    ([`SessionState`]).
//! 3. **Authentication** — the two-round salted-digest handshake
//!    ([`DigestProvider`], [`negotiate`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Client layer (above)  ← drives connect/auth, issues typed requests
//!     ↕
//! Session layer (this crate)  ← identifiers, pending table, auth math
//!     ↕
//! Protocol layer (below)  ← envelope and notification types
//! ```

mod auth;
mod correlator;
mod error;
mod session;

pub use auth::{
    negotiate, remaining_attempts, AuthChallenge, DigestProvider,
    Sha256Digest, REMAINING_ATTEMPTS_OFFSET,
};
pub use correlator::{MessageId, RequestCorrelator};
pub use error::SessionError;
pub use session::SessionState;
