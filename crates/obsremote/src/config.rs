//! Client configuration and protocol constants.
//!
//! The constants are the connection's single source of truth: held here
//! as one immutable configuration value injected at client construction,
//! never as mutable shared state.

/// API version the remote controller reports through the version query.
pub const API_VERSION: f64 = 1.2;

/// Subprotocol identifier offered during the WebSocket handshake.
pub const WS_PROTOCOL: &str = "obsapi";

/// Port used when the connect address doesn't name one.
pub const DEFAULT_PORT: u16 = 4444;

/// Configuration for one client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Subprotocol offered at connect time. Defaults to [`WS_PROTOCOL`].
    pub subprotocol: String,

    /// Port appended to connect addresses that don't carry one.
    /// Defaults to [`DEFAULT_PORT`].
    pub default_port: u16,

    /// When `true`, every inbound frame is logged at debug level before
    /// dispatch.
    pub debug: bool,

    /// Buffered capacity of the event stream. Subscribers that fall
    /// further behind than this miss the oldest events.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            subprotocol: WS_PROTOCOL.to_owned(),
            default_port: DEFAULT_PORT,
            debug: false,
            event_capacity: 64,
        }
    }
}
