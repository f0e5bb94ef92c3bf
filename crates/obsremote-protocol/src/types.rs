//! Envelope types and inbound-message classification.
//!
//! Everything on the wire is a flat JSON object. Outbound objects are
//! [`RequestEnvelope`]s; inbound objects are either a [`ResponseEnvelope`]
//! (correlated back to a request by `"message-id"`) or a [`Notification`]
//! (server-pushed, tagged by `"update-type"`, never correlated).

use serde::{Deserialize, Serialize};

#[cfg(feature = "json")]
use serde_json::{Map, Value};

use crate::records::{AudioChannel, Source, StreamStats};
#[cfg(feature = "json")]
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// An outbound request: identifier, operation name, and operation-specific
/// fields flattened alongside them.
///
/// The identifier is a *decimal string* on the wire even though the
/// session allocates it from an integer counter — that is the peer's
/// convention, not ours to change.
#[cfg(feature = "json")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "message-id")]
    pub message_id: String,
    #[serde(rename = "request-type")]
    pub request_type: String,
    /// Request-specific fields, hyphenated lowercase keys.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(feature = "json")]
impl RequestEnvelope {
    /// Creates an envelope with no request-specific fields.
    pub fn new(
        request_type: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            request_type: request_type.into(),
            fields: Map::new(),
        }
    }

    /// Adds one request-specific field. Builder-style so call sites read
    /// like the wire object they produce.
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Outcome tag of a response, `"ok"` or `"error"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// An inbound response, correlated back to its request by `message_id`.
///
/// Error responses are still well-formed envelopes: `status` is
/// [`Status::Error`] and `error` carries the server's text. They are
/// delivered to the awaiting caller like any other response — deciding
/// how to surface the failure is the caller's job.
#[cfg(feature = "json")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "message-id")]
    pub message_id: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response-specific fields, flattened beside the envelope keys.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(feature = "json")]
impl ResponseEnvelope {
    /// `true` when the peer reported success.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// The server's error text, or `""` for success responses.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    /// Looks up one response-specific field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Deserializes one response-specific field into a typed value.
    pub fn parse_field<T>(&self, key: &str) -> Result<T, ProtocolError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.fields.get(key).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "response missing field `{key}`"
            ))
        })?;
        serde_json::from_value(value.clone()).map_err(ProtocolError::Decode)
    }

    /// Deserializes the whole response-specific field set into a typed
    /// record. Used for responses that *are* the record, like the
    /// current-scene fetch.
    pub fn parse_fields<T>(&self) -> Result<T, ProtocolError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(ProtocolError::Decode)
    }
}

/// The authentication-requirement payload returned by `GetAuthRequired`.
///
/// These fields are camelCase on the wire — the one corner of the
/// protocol that predates the hyphenated convention.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthRequirement {
    #[serde(rename = "authRequired", default)]
    pub auth_required: bool,
    #[serde(default)]
    pub salt: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A server-pushed notification, tagged by `"update-type"`.
///
/// This is a closed sum type: every kind the client understands has a
/// variant, and the dispatcher matches it exhaustively. Kinds the client
/// does not understand never reach this enum — classification routes
/// them to [`Inbound::Unknown`] instead, so protocol growth on the
/// server side cannot break dispatch.
///
/// Payload fields default where possible: push notifications are
/// deliberately lean and a missing field is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "update-type")]
pub enum Notification {
    // -- Streaming lifecycle --
    StreamStarting {
        #[serde(rename = "preview-only", default)]
        preview_only: bool,
    },
    StreamStopping {
        #[serde(rename = "preview-only", default)]
        preview_only: bool,
    },
    /// Periodic health counters while streaming.
    StreamStatus(StreamStats),

    // -- Recording lifecycle --
    RecordingStarting,
    RecordingStarted,
    RecordingStopping,
    RecordingStopped,

    // -- Scenes --
    SwitchScenes {
        #[serde(rename = "scene-name", default)]
        scene_name: String,
    },
    /// The scene list changed. Carries no payload — the current list
    /// must be fetched before anything useful can be delivered.
    ScenesChanged,
    /// Source order changed in the current scene. Also payload-free.
    SourceOrderChanged,

    // -- Sources --
    RepopulateSources {
        #[serde(default)]
        sources: Vec<Source>,
    },
    SourceChanged {
        #[serde(rename = "source-name", default)]
        source_name: String,
        source: Source,
    },
    /// The global audio source set changed; the new set must be fetched.
    GlobalAudioSourcesChanged,

    // -- Scene items --
    ItemAdd {
        #[serde(rename = "item-name", default)]
        item_name: String,
    },
    ItemRemove {
        #[serde(rename = "item-name", default)]
        item_name: String,
    },
    ItemVisible {
        #[serde(rename = "item-name", default)]
        item_name: String,
        #[serde(default)]
        visible: bool,
    },
    ItemReorder {
        #[serde(rename = "item-names", default)]
        item_names: Vec<String>,
    },
    ItemRenamed {
        #[serde(rename = "old-name", default)]
        old_name: String,
        #[serde(rename = "new-name", default)]
        new_name: String,
    },
    ItemSelect {
        #[serde(rename = "item-name", default)]
        item_name: String,
    },
    ItemDeselect {
        #[serde(rename = "item-name", default)]
        item_name: String,
    },

    // -- Mixer --
    VolumeChanged {
        channel: AudioChannel,
        #[serde(default)]
        volume: f64,
        #[serde(default)]
        muted: bool,
        /// `false` while the fader is still being dragged.
        #[serde(rename = "finalValue", default)]
        final_value: bool,
    },

    // -- Configuration --
    ProfileChanged,
    ProfileListChanged,
    SceneCollectionChanged,
    SceneCollectionListChanged,

    /// The controller is shutting down.
    Exit,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// One classified inbound message.
#[cfg(feature = "json")]
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A response to a pending request.
    Response(ResponseEnvelope),
    /// A recognized server-pushed notification.
    Notification(Notification),
    /// A notification kind this client does not understand. Carried
    /// whole so the caller can log it; never fatal.
    Unknown { update_type: String, raw: Value },
}

#[cfg(feature = "json")]
impl Inbound {
    /// Classifies a parsed wire object.
    ///
    /// The rule is the protocol's: an `"update-type"` field makes it a
    /// notification, anything else is treated as a response. A
    /// notification whose kind (or payload shape) is unrecognized
    /// becomes [`Inbound::Unknown`] rather than an error.
    pub fn classify(value: Value) -> Result<Self, ProtocolError> {
        match value.get("update-type") {
            Some(tag) => {
                let update_type =
                    tag.as_str().unwrap_or_default().to_owned();
                match serde_json::from_value::<Notification>(value.clone())
                {
                    Ok(notification) => {
                        Ok(Inbound::Notification(notification))
                    }
                    Err(_) => Ok(Inbound::Unknown { update_type, raw: value }),
                }
            }
            None => serde_json::from_value(value)
                .map(Inbound::Response)
                .map_err(ProtocolError::Decode),
        }
    }

    /// Parses raw frame text and classifies it.
    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(ProtocolError::Decode)?;
        Self::classify(value)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, feature = "json"))]
mod tests {
    //! The wire format is fixed by the remote peer, so these tests pin
    //! exact JSON shapes: hyphenated keys, string message identifiers,
    //! camelCase auth fields, and the update-type tag.

    use super::*;
    use crate::records::SourceKind;
    use serde_json::json;

    // =====================================================================
    // RequestEnvelope
    // =====================================================================

    #[test]
    fn test_request_envelope_wire_shape() {
        let req = RequestEnvelope::new("SetCurrentScene", "7")
            .with_field("scene-name", "Interview");
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["message-id"], "7");
        assert_eq!(value["request-type"], "SetCurrentScene");
        assert_eq!(value["scene-name"], "Interview");
    }

    #[test]
    fn test_request_envelope_without_fields() {
        let req = RequestEnvelope::new("GetVersion", "1");
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(
            value.as_object().unwrap().len(),
            2,
            "only message-id and request-type should be present"
        );
    }

    #[test]
    fn test_request_envelope_message_id_is_a_string() {
        let req = RequestEnvelope::new("GetVersion", "42");
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains(r#""message-id":"42""#));
    }

    // =====================================================================
    // ResponseEnvelope
    // =====================================================================

    #[test]
    fn test_response_ok_parses() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "message-id": "3",
            "status": "ok",
            "version": 1.1
        }))
        .unwrap();

        assert_eq!(resp.message_id, "3");
        assert!(resp.is_ok());
        assert_eq!(resp.error_text(), "");
        assert_eq!(resp.parse_field::<f64>("version").unwrap(), 1.1);
    }

    #[test]
    fn test_response_error_parses_and_keeps_text() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "message-id": "4",
            "status": "error",
            "error": "no scene named that"
        }))
        .unwrap();

        assert!(!resp.is_ok());
        assert_eq!(resp.error_text(), "no scene named that");
    }

    #[test]
    fn test_response_missing_field_is_invalid_message() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "message-id": "5",
            "status": "ok"
        }))
        .unwrap();

        let result = resp.parse_field::<f64>("version");
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_response_parse_fields_whole_record() {
        let resp: ResponseEnvelope = serde_json::from_value(json!({
            "message-id": "6",
            "status": "ok",
            "name": "Main",
            "sources": [{"name": "webcam", "type": 0}]
        }))
        .unwrap();

        let scene: crate::Scene = resp.parse_fields().unwrap();
        assert_eq!(scene.name, "Main");
        assert_eq!(scene.sources.len(), 1);
    }

    #[test]
    fn test_auth_requirement_camel_case_fields() {
        let auth: AuthRequirement = serde_json::from_value(json!({
            "authRequired": true,
            "salt": "abc",
            "challenge": "def"
        }))
        .unwrap();

        assert!(auth.auth_required);
        assert_eq!(auth.salt.as_deref(), Some("abc"));
        assert_eq!(auth.challenge.as_deref(), Some("def"));
    }

    #[test]
    fn test_auth_requirement_not_required_omits_material() {
        let auth: AuthRequirement =
            serde_json::from_value(json!({"authRequired": false})).unwrap();
        assert!(!auth.auth_required);
        assert!(auth.salt.is_none());
        assert!(auth.challenge.is_none());
    }

    // =====================================================================
    // Notification — wire tag and per-kind payloads
    // =====================================================================

    #[test]
    fn test_switch_scenes_parses_scene_name() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "SwitchScenes",
            "scene-name": "Scene A"
        }))
        .unwrap();

        assert_eq!(
            n,
            Notification::SwitchScenes { scene_name: "Scene A".into() }
        );
    }

    #[test]
    fn test_stream_starting_defaults_preview_flag() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "StreamStarting"
        }))
        .unwrap();

        assert_eq!(
            n,
            Notification::StreamStarting { preview_only: false }
        );
    }

    #[test]
    fn test_stream_status_carries_stats() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "StreamStatus",
            "streaming": true,
            "bytes-per-sec": 1000,
            "fps": 30.0
        }))
        .unwrap();

        match n {
            Notification::StreamStatus(stats) => {
                assert!(stats.streaming);
                assert_eq!(stats.bytes_per_sec, 1000);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_scenes_changed_is_payload_free() {
        // The wire object may carry extra fields; the variant stays unit
        // because the real payload must be fetched separately.
        let n: Notification = serde_json::from_value(json!({
            "update-type": "ScenesChanged",
            "whatever": 1
        }))
        .unwrap();
        assert_eq!(n, Notification::ScenesChanged);
    }

    #[test]
    fn test_repopulate_sources_parses_entries() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "RepopulateSources",
            "sources": [{"name": "mic", "type": 0, "audio": true}]
        }))
        .unwrap();

        match n {
            Notification::RepopulateSources { sources } => {
                assert_eq!(sources.len(), 1);
                assert_eq!(sources[0].name, "mic");
                assert!(sources[0].audio);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_source_changed_parses_record() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "SourceChanged",
            "source-name": "webcam",
            "source": {"name": "webcam-2", "type": 0}
        }))
        .unwrap();

        match n {
            Notification::SourceChanged { source_name, source } => {
                assert_eq!(source_name, "webcam");
                assert_eq!(source.name, "webcam-2");
                assert_eq!(source.kind, SourceKind::Input);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_volume_changed_parses_channel_and_final_flag() {
        let n: Notification = serde_json::from_value(json!({
            "update-type": "VolumeChanged",
            "channel": "desktop",
            "volume": 0.5,
            "muted": false,
            "finalValue": false
        }))
        .unwrap();

        assert_eq!(
            n,
            Notification::VolumeChanged {
                channel: AudioChannel::Desktop,
                volume: 0.5,
                muted: false,
                final_value: false,
            }
        );
    }

    #[test]
    fn test_item_notifications_parse_hyphenated_fields() {
        let renamed: Notification = serde_json::from_value(json!({
            "update-type": "ItemRenamed",
            "old-name": "cam",
            "new-name": "camera"
        }))
        .unwrap();
        assert_eq!(
            renamed,
            Notification::ItemRenamed {
                old_name: "cam".into(),
                new_name: "camera".into(),
            }
        );

        let visible: Notification = serde_json::from_value(json!({
            "update-type": "ItemVisible",
            "item-name": "overlay",
            "visible": false
        }))
        .unwrap();
        assert_eq!(
            visible,
            Notification::ItemVisible {
                item_name: "overlay".into(),
                visible: false,
            }
        );

        let reorder: Notification = serde_json::from_value(json!({
            "update-type": "ItemReorder",
            "item-names": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(
            reorder,
            Notification::ItemReorder {
                item_names: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn test_unit_lifecycle_notifications_parse() {
        for (tag, expected) in [
            ("RecordingStarting", Notification::RecordingStarting),
            ("RecordingStarted", Notification::RecordingStarted),
            ("RecordingStopping", Notification::RecordingStopping),
            ("RecordingStopped", Notification::RecordingStopped),
            ("ProfileChanged", Notification::ProfileChanged),
            ("ProfileListChanged", Notification::ProfileListChanged),
            (
                "SceneCollectionChanged",
                Notification::SceneCollectionChanged,
            ),
            (
                "SceneCollectionListChanged",
                Notification::SceneCollectionListChanged,
            ),
            (
                "GlobalAudioSourcesChanged",
                Notification::GlobalAudioSourcesChanged,
            ),
            ("Exit", Notification::Exit),
        ] {
            let n: Notification =
                serde_json::from_value(json!({ "update-type": tag }))
                    .unwrap();
            assert_eq!(n, expected, "tag {tag}");
        }
    }

    // =====================================================================
    // Classification
    // =====================================================================

    #[test]
    fn test_classify_update_type_as_notification() {
        let inbound = Inbound::from_text(
            r#"{"update-type": "SwitchScenes", "scene-name": "B"}"#,
        )
        .unwrap();
        assert!(matches!(inbound, Inbound::Notification(_)));
    }

    #[test]
    fn test_classify_message_id_as_response() {
        let inbound = Inbound::from_text(
            r#"{"message-id": "9", "status": "ok"}"#,
        )
        .unwrap();
        match inbound {
            Inbound::Response(resp) => assert_eq!(resp.message_id, "9"),
            other => panic!("wrong classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown_update_type_is_not_an_error() {
        let inbound = Inbound::from_text(
            r#"{"update-type": "HologramEngaged", "power": 9000}"#,
        )
        .unwrap();
        match inbound {
            Inbound::Unknown { update_type, raw } => {
                assert_eq!(update_type, "HologramEngaged");
                assert_eq!(raw["power"], 9000);
            }
            other => panic!("wrong classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_error_status_is_still_a_response() {
        let inbound = Inbound::from_text(
            r#"{"message-id": "2", "status": "error", "error": "denied"}"#,
        )
        .unwrap();
        match inbound {
            Inbound::Response(resp) => {
                assert!(!resp.is_ok());
                assert_eq!(resp.error_text(), "denied");
            }
            other => panic!("wrong classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_garbage_returns_decode_error() {
        let result = Inbound::from_text("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_classify_response_missing_status_is_an_error() {
        let result = Inbound::from_text(r#"{"message-id": "1"}"#);
        assert!(result.is_err());
    }
}
