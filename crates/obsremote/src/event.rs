//! Application-visible events.
//!
//! Every connection lifecycle change and every routed notification
//! surfaces as one [`Event`] on the subscribable stream. Fetch-then-
//! deliver kinds ([`Event::SceneListChanged`] and friends) carry the
//! *fetched* state, not the lean notification that announced it.

use obsremote_protocol::{Scene, Source, StreamStats};
use tokio::sync::broadcast;

/// One event delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Connection lifecycle --
    /// The connection opened and the auth requirement is known.
    ConnectionOpened { auth_required: bool },
    /// The connection closed cleanly.
    ConnectionClosed,
    /// The connection could not be established, or failed while open.
    ConnectionFailed,

    // -- Authentication --
    AuthenticationSucceeded,
    AuthenticationFailed { remaining_attempts: u32 },

    // -- Streaming --
    StreamStarted { preview_only: bool },
    StreamStopped { preview_only: bool },
    /// Periodic health counters while live.
    StreamStatus(StreamStats),

    // -- Recording --
    RecordingStarting,
    RecordingStarted,
    RecordingStopping,
    RecordingStopped,

    // -- Scenes --
    SceneSwitched { scene_name: String },
    /// The scene list changed; carries the freshly fetched list.
    SceneListChanged {
        current_scene: String,
        scenes: Vec<Scene>,
    },
    /// Source order changed; carries the current scene's fetched sources.
    SourceOrderChanged { sources: Vec<Source> },

    // -- Sources --
    SourcesRepopulated { sources: Vec<Source> },
    SourceChanged {
        original_name: String,
        source: Source,
    },
    /// The global audio set changed; carries the freshly fetched set.
    GlobalAudioSourcesChanged { sources: Vec<Source> },

    // -- Scene items --
    ItemAdded { item_name: String },
    ItemRemoved { item_name: String },
    ItemVisibilityChanged { item_name: String, visible: bool },
    ItemsReordered { item_names: Vec<String> },
    ItemRenamed { old_name: String, new_name: String },
    ItemSelected { item_name: String },
    ItemDeselected { item_name: String },

    // -- Mixer --
    MicrophoneVolumeChanged {
        volume: f64,
        muted: bool,
        /// `true` while the fader is still being dragged.
        adjusting: bool,
    },
    DesktopVolumeChanged {
        volume: f64,
        muted: bool,
        adjusting: bool,
    },

    // -- Configuration --
    ProfileChanged,
    ProfileListChanged,
    SceneCollectionChanged,
    SceneCollectionListChanged,

    /// The controller is shutting down.
    Exited,
}

/// A subscription to the client's event stream.
///
/// Obtained from [`ObsRemoteClient::subscribe`]; dropping it
/// unsubscribes. Multiple independent subscriptions may coexist — each
/// receives every event.
///
/// [`ObsRemoteClient::subscribe`]: crate::ObsRemoteClient::subscribe
pub struct EventStream {
    rx: broadcast::Receiver<Event>,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<Event>) -> Self {
        Self { rx }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the client has been dropped and the buffered
    /// backlog is drained. A subscriber that falls behind the stream's
    /// buffered capacity skips the missed events (logged) rather than
    /// stalling the session.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event subscriber lagging");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
