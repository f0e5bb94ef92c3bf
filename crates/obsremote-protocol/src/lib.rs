//! Wire protocol for the remote-controller connection.
//!
//! This crate defines the "language" the client and the controller speak:
//!
//! - **Envelopes** ([`RequestEnvelope`], [`ResponseEnvelope`],
//!   [`Notification`]) — the JSON objects that travel on the wire.
//! - **Records** ([`Scene`], [`Source`], [`StreamStats`], [`Volumes`]) —
//!   the typed payloads carried inside envelopes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   converted to and from frame text.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the
//! session engine (correlation, authentication). It doesn't know about
//! connections or pending requests — it only knows how to shape and
//! classify messages.
//!
//! ```text
//! Transport (frames) → Protocol (envelopes) → Session (correlation)
//! ```
//!
//! # Wire conventions
//!
//! Outbound requests always carry `"message-id"` (a decimal string) and
//! `"request-type"`. Inbound objects with an `"update-type"` field are
//! server-pushed notifications; everything else is a response correlated
//! by `"message-id"`. Multi-word keys are hyphenated lowercase, except
//! the authentication-requirement fields which predate that convention
//! and stay camelCase.

mod codec;
mod error;
mod records;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use records::{
    AudioChannel, Scene, Source, SourceKind, StreamStats,
    StreamingStatus, Volumes,
};
pub use types::{AuthRequirement, Notification, Status};
#[cfg(feature = "json")]
pub use types::{Inbound, RequestEnvelope, ResponseEnvelope};
