//! The client: connect lifecycle, request issuing, event subscription.
//!
//! One [`ObsRemoteClient`] represents one logical session to the remote
//! controller. It owns at most one live connection at a time; calling
//! [`connect`](ObsRemoteClient::connect) while connected closes the old
//! connection before opening the new one. All request-issuing methods
//! require a live connection and return
//! [`ObsRemoteError::NotConnected`] otherwise.

use std::sync::{Arc, Mutex};

use obsremote_protocol::{
    AudioChannel, AuthRequirement, Codec, JsonCodec, RequestEnvelope,
    ResponseEnvelope, Scene, Source, StreamingStatus, Volumes,
};
use obsremote_session::{
    negotiate, remaining_attempts, AuthChallenge, DigestProvider,
    RequestCorrelator, SessionError, SessionState, Sha256Digest,
};
use obsremote_transport::{
    Connection, ConnectionId, Transport, WebSocketConnection,
    WebSocketTransport,
};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::dispatch::read_loop;
use crate::{ClientConfig, Event, EventStream, ObsRemoteError};

/// Fills in the default host and port the way the historical client
/// did: empty address means `localhost`, and an address without a port
/// (or with a bare trailing `:`) gets the default appended.
fn normalize_address(address: &str, default_port: u16) -> String {
    let address = if address.is_empty() { "localhost" } else { address };
    match address.find(':') {
        Some(idx) if idx + 1 < address.len() => address.to_owned(),
        Some(_) => format!("{address}{default_port}"),
        None => format!("{address}:{default_port}"),
    }
}

/// Builds a request field map from literal entries.
fn fields<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between the client handle, the read-loop task, and
/// fetch-then-deliver tasks.
///
/// The locks guard short critical sections only and are never held
/// across an await point.
pub(crate) struct ClientInner<D: DigestProvider> {
    config: ClientConfig,
    codec: JsonCodec,
    digest: D,
    state: Mutex<SessionState>,
    conn: Mutex<Option<Arc<WebSocketConnection>>>,
    correlator: RequestCorrelator,
    challenge: Mutex<Option<AuthChallenge>>,
    events: broadcast::Sender<Event>,
}

impl<D: DigestProvider> ClientInner<D> {
    pub(crate) fn new(config: ClientConfig, digest: D) -> Self {
        let (events, _) =
            broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            codec: JsonCodec,
            digest,
            state: Mutex::new(SessionState::Disconnected),
            conn: Mutex::new(None),
            correlator: RequestCorrelator::new(),
            challenge: Mutex::new(None),
            events,
        }
    }

    pub(crate) fn debug_enabled(&self) -> bool {
        self.config.debug
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine; events are observability, not control.
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock().expect("state poisoned")
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        *self.state.lock().expect("state poisoned") = state;
    }

    fn current_connection(&self) -> Option<Arc<WebSocketConnection>> {
        self.conn.lock().expect("conn poisoned").clone()
    }

    /// Installs a freshly dialed connection and restarts the identifier
    /// sequence for it.
    fn install_connection(&self, conn: Arc<WebSocketConnection>) {
        self.correlator.reset();
        *self.conn.lock().expect("conn poisoned") = Some(conn);
        self.set_state(SessionState::AwaitingAuthRequirement);
    }

    /// Tears down the current connection, discarding pending requests
    /// without delivery.
    async fn drop_connection(&self) {
        let old = self.conn.lock().expect("conn poisoned").take();
        if let Some(conn) = old {
            self.correlator.reset();
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "closing old connection failed");
            }
        }
    }

    /// Reacts to the read loop ending. Only the connection the session
    /// still considers current may drive state — a loop left over from
    /// a replaced connection exits silently.
    pub(crate) fn connection_ended(&self, id: ConnectionId, clean: bool) {
        {
            let mut conn = self.conn.lock().expect("conn poisoned");
            let is_current =
                conn.as_ref().is_some_and(|current| current.id() == id);
            if !is_current {
                return;
            }
            *conn = None;
        }
        self.correlator.reset();
        self.set_state(SessionState::Disconnected);
        if clean {
            tracing::info!(%id, "connection closed");
            self.emit(Event::ConnectionClosed);
        } else {
            tracing::warn!(%id, "connection failed");
            self.emit(Event::ConnectionFailed);
        }
    }

    fn store_challenge(&self, challenge: AuthChallenge) {
        *self.challenge.lock().expect("challenge poisoned") =
            Some(challenge);
    }

    /// Takes the stored challenge material; each attempt consumes it.
    fn take_challenge(&self) -> Option<AuthChallenge> {
        self.challenge.lock().expect("challenge poisoned").take()
    }

    /// Resolves one inbound response to its pending slot.
    pub(crate) fn resolve(&self, response: ResponseEnvelope) -> bool {
        self.correlator.resolve(response)
    }

    // -- Request plumbing --

    /// Sends one request and awaits its correlated response, error
    /// responses included — interpreting `status` is the caller's job.
    pub(crate) async fn request(
        &self,
        request_type: &str,
        request_fields: Map<String, Value>,
    ) -> Result<ResponseEnvelope, ObsRemoteError> {
        let conn = self
            .current_connection()
            .ok_or(ObsRemoteError::NotConnected)?;

        let (id, rx) = self.correlator.register();
        let mut envelope =
            RequestEnvelope::new(request_type, id.to_string());
        envelope.fields = request_fields;
        let text = self.codec.encode(&envelope)?;

        tracing::trace!(request_type, %id, "sending request");
        if let Err(e) = conn.send(&text).await {
            // Never made it onto the wire; no response can arrive.
            self.correlator.discard(id);
            return Err(e.into());
        }

        rx.await.map_err(|_| {
            ObsRemoteError::Session(SessionError::ConnectionLost)
        })
    }

    /// Like [`request`](Self::request), but converts an error-status
    /// response into [`ObsRemoteError::RequestFailed`].
    pub(crate) async fn request_ok(
        &self,
        request_type: &str,
        request_fields: Map<String, Value>,
    ) -> Result<ResponseEnvelope, ObsRemoteError> {
        let response = self.request(request_type, request_fields).await?;
        if response.is_ok() {
            Ok(response)
        } else {
            Err(ObsRemoteError::RequestFailed {
                request_type: request_type.to_owned(),
                message: response.error_text().to_owned(),
            })
        }
    }

    // -- Fetches shared between the public surface and the dispatcher --

    pub(crate) async fn scene_list(
        &self,
    ) -> Result<(String, Vec<Scene>), ObsRemoteError> {
        let response = self.request_ok("GetSceneList", Map::new()).await?;
        let current: String = response.parse_field("current-scene")?;
        let scenes: Vec<Scene> = response.parse_field("scenes")?;
        Ok((current, scenes))
    }

    pub(crate) async fn current_scene(
        &self,
    ) -> Result<Scene, ObsRemoteError> {
        let response =
            self.request_ok("GetCurrentScene", Map::new()).await?;
        Ok(response.parse_fields()?)
    }

    pub(crate) async fn global_audio_sources(
        &self,
    ) -> Result<Vec<Source>, ObsRemoteError> {
        let response = self
            .request_ok("GetGlobalAudioSources", Map::new())
            .await?;
        Ok(response.parse_field("sources")?)
    }
}

// ---------------------------------------------------------------------------
// Client handle
// ---------------------------------------------------------------------------

/// Async client for the remote controller's WebSocket protocol.
///
/// ## Example
///
/// ```rust,no_run
/// use obsremote::{Event, ObsRemoteClient};
///
/// # async fn run() -> Result<(), obsremote::ObsRemoteError> {
/// let client = ObsRemoteClient::new();
/// let mut events = client.subscribe();
///
/// client.connect("localhost", Some("hunter2")).await?;
/// client.set_current_scene("Interview").await?;
///
/// while let Some(event) = events.recv().await {
///     if let Event::SceneSwitched { scene_name } = event {
///         println!("now live: {scene_name}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct ObsRemoteClient<D: DigestProvider = Sha256Digest> {
    inner: Arc<ClientInner<D>>,
}

impl<D: DigestProvider> Clone for ObsRemoteClient<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl ObsRemoteClient {
    /// Creates a client with default configuration and the bundled
    /// SHA-256 digest provider.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with the given configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_digest(config, Sha256Digest)
    }
}

impl Default for ObsRemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DigestProvider> ObsRemoteClient<D> {
    /// Creates a client with a host-supplied digest provider.
    pub fn with_digest(config: ClientConfig, digest: D) -> Self {
        Self {
            inner: Arc::new(ClientInner::new(config, digest)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// Subscribes to the event stream. Dropping the returned stream
    /// unsubscribes; any number of subscriptions may coexist.
    pub fn subscribe(&self) -> EventStream {
        self.inner.subscribe()
    }

    // -- Lifecycle --

    /// Connects to the controller at `address` ("host" or "host:port",
    /// defaulting to `localhost` and the protocol port), then drives the
    /// open → query-auth → authenticate-if-required sequence.
    ///
    /// Emits [`Event::ConnectionOpened`] once the auth requirement is
    /// known, then either [`Event::AuthenticationSucceeded`] or
    /// [`Event::AuthenticationFailed`] when authentication runs. On
    /// success the session is [`SessionState::Ready`].
    ///
    /// An already-connected client closes its old connection first —
    /// pending requests on it are dropped undelivered.
    pub async fn connect(
        &self,
        address: &str,
        password: Option<&str>,
    ) -> Result<(), ObsRemoteError> {
        let password = password.unwrap_or("");
        let address =
            normalize_address(address, self.inner.config.default_port);
        let url = format!("ws://{address}");

        self.inner.drop_connection().await;
        self.inner.set_state(SessionState::Connecting);

        let conn = match WebSocketTransport
            .connect(&url, &self.inner.config.subprotocol)
            .await
        {
            Ok(conn) => Arc::new(conn),
            Err(e) => {
                self.inner.set_state(SessionState::Disconnected);
                self.inner.emit(Event::ConnectionFailed);
                return Err(e.into());
            }
        };

        tracing::info!(%address, id = %conn.id(), "connection open");
        self.inner.install_connection(Arc::clone(&conn));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(read_loop(inner, conn));

        let auth_required = self.is_auth_required().await?;
        self.inner.emit(Event::ConnectionOpened { auth_required });

        if auth_required {
            self.authenticate(password).await
        } else {
            self.inner.set_state(SessionState::Ready);
            Ok(())
        }
    }

    /// Shuts the session down for good. No `ConnectionClosed` event is
    /// emitted for a deliberate close.
    pub async fn close(&self) {
        self.inner.set_state(SessionState::Closed);
        self.inner.drop_connection().await;
    }

    // -- Authentication --

    /// Queries whether the controller requires authentication, storing
    /// the returned challenge material for the next
    /// [`authenticate`](Self::authenticate) call.
    pub async fn is_auth_required(&self) -> Result<bool, ObsRemoteError> {
        let response = self
            .inner
            .request_ok("GetAuthRequired", Map::new())
            .await?;
        let auth: AuthRequirement = response.parse_fields()?;
        if auth.auth_required {
            self.inner.store_challenge(AuthChallenge {
                salt: auth.salt.unwrap_or_default(),
                challenge: auth.challenge.unwrap_or_default(),
            });
        }
        Ok(auth.auth_required)
    }

    /// Authenticates with the stored challenge material, consuming it.
    ///
    /// A failed attempt leaves the connection open and returns the
    /// server-reported remaining-attempt count; retrying requires a
    /// fresh [`is_auth_required`](Self::is_auth_required) query first.
    pub async fn authenticate(
        &self,
        password: &str,
    ) -> Result<(), ObsRemoteError> {
        let challenge = self
            .inner
            .take_challenge()
            .ok_or(SessionError::MissingChallenge)?;
        self.inner.set_state(SessionState::Authenticating);

        let auth = negotiate(&self.inner.digest, password, &challenge)?;
        let response = self
            .inner
            .request("Authenticate", fields([("auth", auth.into())]))
            .await?;

        if response.is_ok() {
            self.inner.set_state(SessionState::Ready);
            self.inner.emit(Event::AuthenticationSucceeded);
            Ok(())
        } else {
            let remaining = remaining_attempts(response.error_text());
            tracing::warn!(
                remaining_attempts = remaining,
                "authentication rejected"
            );
            self.inner
                .set_state(SessionState::AwaitingAuthRequirement);
            self.inner.emit(Event::AuthenticationFailed {
                remaining_attempts: remaining,
            });
            Err(ObsRemoteError::AuthenticationFailed {
                remaining_attempts: remaining,
            })
        }
    }

    // -- Raw requests --
    //
    // Escape hatch for request types without a typed wrapper. Two call
    // shapes rather than one optional-argument method, matching how the
    // typed surface is built on top.

    /// Sends a request with no request-specific fields and awaits its
    /// response envelope, whatever its status.
    pub async fn send_request(
        &self,
        request_type: &str,
    ) -> Result<ResponseEnvelope, ObsRemoteError> {
        self.inner.request(request_type, Map::new()).await
    }

    /// Sends a request with the given fields and awaits its response
    /// envelope, whatever its status.
    pub async fn send_request_with(
        &self,
        request_type: &str,
        request_fields: Map<String, Value>,
    ) -> Result<ResponseEnvelope, ObsRemoteError> {
        self.inner.request(request_type, request_fields).await
    }

    // -- Queries --

    /// Fetches the controller's API version.
    pub async fn get_version(&self) -> Result<f64, ObsRemoteError> {
        let response =
            self.inner.request_ok("GetVersion", Map::new()).await?;
        Ok(response.parse_field("version")?)
    }

    /// Fetches the current scene name and the full scene list.
    pub async fn get_scene_list(
        &self,
    ) -> Result<(String, Vec<Scene>), ObsRemoteError> {
        self.inner.scene_list().await
    }

    /// Fetches the scene names only.
    pub async fn get_scene_names(
        &self,
    ) -> Result<Vec<String>, ObsRemoteError> {
        let response =
            self.inner.request_ok("GetSceneNames", Map::new()).await?;
        let scenes: Vec<Scene> = response.parse_field("scenes")?;
        Ok(scenes.into_iter().map(|scene| scene.name).collect())
    }

    /// Fetches the current scene with its sources.
    pub async fn get_current_scene(
        &self,
    ) -> Result<Scene, ObsRemoteError> {
        self.inner.current_scene().await
    }

    /// Fetches the current streaming status.
    pub async fn get_streaming_status(
        &self,
    ) -> Result<StreamingStatus, ObsRemoteError> {
        let response = self
            .inner
            .request_ok("GetStreamingStatus", Map::new())
            .await?;
        Ok(response.parse_fields()?)
    }

    /// Fetches volume levels and mute states for both mixer channels.
    pub async fn get_volumes(&self) -> Result<Volumes, ObsRemoteError> {
        let response =
            self.inner.request_ok("GetVolumes", Map::new()).await?;
        Ok(response.parse_fields()?)
    }

    /// Fetches the global audio source set.
    pub async fn get_global_audio_sources(
        &self,
    ) -> Result<Vec<Source>, ObsRemoteError> {
        self.inner.global_audio_sources().await
    }

    // -- Commands --

    /// Switches to the named scene. A successful switch is also pushed
    /// back as a scene-switched event.
    pub async fn set_current_scene(
        &self,
        scene_name: &str,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "SetCurrentScene",
                fields([("scene-name", scene_name.into())]),
            )
            .await
            .map(drop)
    }

    /// Reorders sources in the current scene.
    ///
    /// The field is `scene-names` on the wire even though it carries
    /// source names — a protocol quirk kept for compatibility.
    pub async fn set_sources_order(
        &self,
        source_names: Vec<String>,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "SetSourcesOrder",
                fields([("scene-names", source_names.into())]),
            )
            .await
            .map(drop)
    }

    /// Shows or hides a source in the current scene.
    pub async fn set_source_render(
        &self,
        source: &str,
        render: bool,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "SetSourceRender",
                fields([("source", source.into()), ("render", render.into())]),
            )
            .await
            .map(drop)
    }

    /// Starts or stops streaming (or previewing, when `preview_only`).
    /// The outcome arrives as a stream-started or stream-stopped event.
    pub async fn toggle_stream(
        &self,
        preview_only: bool,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "StartStopStreaming",
                fields([("preview-only", preview_only.into())]),
            )
            .await
            .map(drop)
    }

    /// Sets a mixer channel's volume. `adjusting` marks a fader still
    /// being dragged, so the controller knows more values are coming.
    pub async fn set_volume(
        &self,
        channel: AudioChannel,
        volume: f64,
        adjusting: bool,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "SetVolume",
                fields([
                    ("channel", channel.as_str().into()),
                    ("volume", volume.into()),
                    ("final", (!adjusting).into()),
                ]),
            )
            .await
            .map(drop)
    }

    /// Sets the microphone channel volume.
    pub async fn set_microphone_volume(
        &self,
        volume: f64,
        adjusting: bool,
    ) -> Result<(), ObsRemoteError> {
        self.set_volume(AudioChannel::Microphone, volume, adjusting)
            .await
    }

    /// Sets the desktop channel volume.
    pub async fn set_desktop_volume(
        &self,
        volume: f64,
        adjusting: bool,
    ) -> Result<(), ObsRemoteError> {
        self.set_volume(AudioChannel::Desktop, volume, adjusting).await
    }

    /// Toggles a mixer channel's mute state.
    pub async fn toggle_mute(
        &self,
        channel: AudioChannel,
    ) -> Result<(), ObsRemoteError> {
        self.inner
            .request_ok(
                "ToggleMute",
                fields([("channel", channel.as_str().into())]),
            )
            .await
            .map(drop)
    }

    /// Toggles the microphone channel's mute state.
    pub async fn toggle_microphone_mute(
        &self,
    ) -> Result<(), ObsRemoteError> {
        self.toggle_mute(AudioChannel::Microphone).await
    }

    /// Toggles the desktop channel's mute state.
    pub async fn toggle_desktop_mute(&self) -> Result<(), ObsRemoteError> {
        self.toggle_mute(AudioChannel::Desktop).await
    }
}
