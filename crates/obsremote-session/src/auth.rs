//! Challenge-response authentication.
//!
//! The handshake proves knowledge of a password without transmitting it:
//! the server issues `salt` and `challenge` strings, and the client
//! answers with a two-round keyed digest. Both rounds are byte-level
//! concatenation of UTF-8 text — order and encoding must match the peer
//! exactly or the response will never verify.
//!
//! The hash itself is behind the [`DigestProvider`] trait so hosts with
//! their own crypto stacks can slot one in; [`Sha256Digest`] is the
//! bundled implementation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::SessionError;

/// Computes the base64 form of a cryptographic digest over a byte string.
///
/// Selected once at client construction and injected as a capability —
/// the negotiator never inspects which algorithm backs it.
pub trait DigestProvider: Send + Sync + 'static {
    /// Returns `base64(H(data))` for the provider's hash `H`.
    ///
    /// # Errors
    /// Providers backed by host crypto may fail when the capability is
    /// missing; the bundled provider never does.
    fn digest_base64(&self, data: &[u8]) -> Result<String, SessionError>;
}

/// The bundled [`DigestProvider`]: SHA-256 via the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestProvider for Sha256Digest {
    fn digest_base64(&self, data: &[u8]) -> Result<String, SessionError> {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Ok(BASE64.encode(hasher.finalize()))
    }
}

/// Server-issued challenge material.
///
/// Populated when the auth-requirement query reports authentication is
/// required; consumed exactly once per authentication attempt. A failed
/// attempt must refresh it by querying again before retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub salt: String,
    pub challenge: String,
}

/// Derives the authentication response for `password` against the given
/// challenge material:
///
/// 1. `secret  = base64(SHA256(password ++ salt))`
/// 2. `response = base64(SHA256(secret ++ challenge))`
///
/// Pure function of its inputs — no round-trips beyond the two digest
/// calls, and any failure is the provider's, propagated unchanged.
pub fn negotiate<D>(
    digest: &D,
    password: &str,
    challenge: &AuthChallenge,
) -> Result<String, SessionError>
where
    D: DigestProvider + ?Sized,
{
    let secret = digest
        .digest_base64(format!("{password}{}", challenge.salt).as_bytes())?;
    digest.digest_base64(
        format!("{secret}{}", challenge.challenge).as_bytes(),
    )
}

/// Byte offset where the remaining-attempt count starts in the server's
/// authentication-failure error text.
///
/// This is a wire convention inherited from the protocol: the count is
/// not a structured field, it is sliced out of the prose. Fragile
/// against any server-side wording change, and preserved as-is for
/// compatibility rather than repaired.
pub const REMAINING_ATTEMPTS_OFFSET: usize = 43;

/// Extracts the remaining-attempt count from an authentication-failure
/// error string. Degrades to 0 when the text is too short, not numeric
/// past the offset, or sliced mid-character.
pub fn remaining_attempts(error_text: &str) -> u32 {
    error_text
        .get(REMAINING_ATTEMPTS_OFFSET..)
        .map(str::trim)
        .and_then(|rest| rest.parse().ok())
        .unwrap_or(0)
}
