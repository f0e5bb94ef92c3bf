//! # obsremote
//!
//! Async Rust client for the OBS Remote WebSocket protocol: a stateful
//! request/response-plus-push-event protocol spoken over one persistent
//! connection to a remote audio/video production controller.
//!
//! The client maintains exactly one logical session, correlates
//! asynchronously-arriving responses with the requests that triggered
//! them, performs the challenge-response handshake when the controller
//! requires it, and turns the stream of server-pushed notifications into
//! typed [`Event`]s — fetching supplementary state on its own when a
//! notification is too lean to be useful as-is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use obsremote::{Event, ObsRemoteClient};
//!
//! # async fn run() -> Result<(), obsremote::ObsRemoteError> {
//! let client = ObsRemoteClient::new();
//! let mut events = client.subscribe();
//!
//! client.connect("localhost", None).await?;
//! println!("controller version {}", client.get_version().await?);
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatch;
mod error;
mod event;

pub use client::ObsRemoteClient;
pub use config::{ClientConfig, API_VERSION, DEFAULT_PORT, WS_PROTOCOL};
pub use error::ObsRemoteError;
pub use event::{Event, EventStream};

// Re-export the layer types callers touch through the public surface.
pub use obsremote_protocol::{
    AudioChannel, RequestEnvelope, ResponseEnvelope, Scene, Source,
    SourceKind, Status, StreamStats, StreamingStatus, Volumes,
};
pub use obsremote_session::{
    AuthChallenge, DigestProvider, SessionState, Sha256Digest,
};

/// Commonly used imports, bundled.
pub mod prelude {
    pub use crate::{
        AudioChannel, ClientConfig, Event, EventStream, ObsRemoteClient,
        ObsRemoteError, Scene, SessionState, Source,
    };
}
