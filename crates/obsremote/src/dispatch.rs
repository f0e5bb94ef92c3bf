//! Per-connection dispatch: inbound classification and notification
//! routing.
//!
//! Each live connection gets one read-loop task running here. The flow
//! for every frame is:
//!   1. Classify: response to a pending request, or pushed notification.
//!   2. Responses resolve their pending slot (error status included).
//!   3. Notifications route to a typed event — directly when the payload
//!      is on the notification, or through a secondary fetch when the
//!      notification only announces that something changed.
//!   4. Unknown notification kinds are logged and dropped, never fatal.

use std::sync::Arc;

use obsremote_protocol::{AudioChannel, Inbound, Notification};
use obsremote_session::DigestProvider;
use obsremote_transport::{Connection, WebSocketConnection};

use crate::client::ClientInner;
use crate::Event;

/// Drives one connection until it closes or fails.
pub(crate) async fn read_loop<D: DigestProvider>(
    inner: Arc<ClientInner<D>>,
    conn: Arc<WebSocketConnection>,
) {
    loop {
        match conn.recv().await {
            Ok(Some(text)) => dispatch(&inner, &text),
            Ok(None) => {
                inner.connection_ended(conn.id(), true);
                break;
            }
            Err(e) => {
                tracing::debug!(id = %conn.id(), error = %e, "receive failed");
                inner.connection_ended(conn.id(), false);
                break;
            }
        }
    }
}

/// Classifies one inbound frame and routes it.
pub(crate) fn dispatch<D: DigestProvider>(
    inner: &Arc<ClientInner<D>>,
    text: &str,
) {
    if inner.debug_enabled() {
        tracing::debug!(frame = text, "inbound message");
    }

    match Inbound::from_text(text) {
        Ok(Inbound::Response(response)) => {
            if !response.is_ok() {
                tracing::debug!(
                    message_id = %response.message_id,
                    error = response.error_text(),
                    "error response"
                );
            }
            // Unknown identifiers occur legitimately after a reconnect
            // reset; stale responses deliver to no one.
            if !inner.resolve(response) {
                tracing::trace!("response without a pending request");
            }
        }
        Ok(Inbound::Notification(notification)) => {
            route(inner, notification);
        }
        Ok(Inbound::Unknown { update_type, raw }) => {
            tracing::warn!(%update_type, %raw, "unknown notification kind");
        }
        Err(e) => {
            tracing::warn!(error = %e, "undecodable frame");
        }
    }
}

/// Routes one recognized notification to its application event.
fn route<D: DigestProvider>(
    inner: &Arc<ClientInner<D>>,
    notification: Notification,
) {
    use Notification as N;

    match notification {
        // -- Streaming --
        N::StreamStarting { preview_only } => {
            inner.emit(Event::StreamStarted { preview_only });
        }
        N::StreamStopping { preview_only } => {
            inner.emit(Event::StreamStopped { preview_only });
        }
        N::StreamStatus(stats) => inner.emit(Event::StreamStatus(stats)),

        // -- Recording --
        N::RecordingStarting => inner.emit(Event::RecordingStarting),
        N::RecordingStarted => inner.emit(Event::RecordingStarted),
        N::RecordingStopping => inner.emit(Event::RecordingStopping),
        N::RecordingStopped => inner.emit(Event::RecordingStopped),

        // -- Scenes --
        N::SwitchScenes { scene_name } => {
            inner.emit(Event::SceneSwitched { scene_name });
        }
        N::ScenesChanged => {
            // The notification is payload-free; the fresh list has to be
            // pulled. The secondary response arrives through this same
            // read loop, so the fetch runs on its own task and the event
            // fires only once that response is in.
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                match inner.scene_list().await {
                    Ok((current_scene, scenes)) => {
                        inner.emit(Event::SceneListChanged {
                            current_scene,
                            scenes,
                        });
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "scene-list fetch failed");
                    }
                }
            });
        }
        N::SourceOrderChanged => {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                match inner.current_scene().await {
                    Ok(scene) => {
                        inner.emit(Event::SourceOrderChanged {
                            sources: scene.sources,
                        });
                    }
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            "current-scene fetch failed"
                        );
                    }
                }
            });
        }

        // -- Sources --
        N::RepopulateSources { sources } => {
            inner.emit(Event::SourcesRepopulated { sources });
        }
        N::SourceChanged { source_name, source } => {
            inner.emit(Event::SourceChanged {
                original_name: source_name,
                source,
            });
        }
        N::GlobalAudioSourcesChanged => {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                match inner.global_audio_sources().await {
                    Ok(sources) => {
                        inner.emit(Event::GlobalAudioSourcesChanged {
                            sources,
                        });
                    }
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            "global-audio fetch failed"
                        );
                    }
                }
            });
        }

        // -- Scene items --
        N::ItemAdd { item_name } => {
            inner.emit(Event::ItemAdded { item_name });
        }
        N::ItemRemove { item_name } => {
            inner.emit(Event::ItemRemoved { item_name });
        }
        N::ItemVisible { item_name, visible } => {
            inner.emit(Event::ItemVisibilityChanged { item_name, visible });
        }
        N::ItemReorder { item_names } => {
            inner.emit(Event::ItemsReordered { item_names });
        }
        N::ItemRenamed { old_name, new_name } => {
            inner.emit(Event::ItemRenamed { old_name, new_name });
        }
        N::ItemSelect { item_name } => {
            inner.emit(Event::ItemSelected { item_name });
        }
        N::ItemDeselect { item_name } => {
            inner.emit(Event::ItemDeselected { item_name });
        }

        // -- Mixer --
        N::VolumeChanged { channel, volume, muted, final_value } => {
            let adjusting = !final_value;
            match channel {
                AudioChannel::Microphone => {
                    inner.emit(Event::MicrophoneVolumeChanged {
                        volume,
                        muted,
                        adjusting,
                    });
                }
                AudioChannel::Desktop => {
                    inner.emit(Event::DesktopVolumeChanged {
                        volume,
                        muted,
                        adjusting,
                    });
                }
            }
        }

        // -- Configuration --
        N::ProfileChanged => inner.emit(Event::ProfileChanged),
        N::ProfileListChanged => inner.emit(Event::ProfileListChanged),
        N::SceneCollectionChanged => {
            inner.emit(Event::SceneCollectionChanged);
        }
        N::SceneCollectionListChanged => {
            inner.emit(Event::SceneCollectionListChanged);
        }

        N::Exit => inner.emit(Event::Exited),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Direct-routing tests drive the dispatcher with raw frame text and
    //! assert on the emitted events — no sockets involved. The
    //! fetch-then-deliver paths need a live peer and are covered by the
    //! crate's integration tests.

    use super::*;
    use crate::ClientConfig;
    use obsremote_session::Sha256Digest;

    fn detached_inner() -> Arc<ClientInner<Sha256Digest>> {
        Arc::new(ClientInner::new(ClientConfig::default(), Sha256Digest))
    }

    #[tokio::test]
    async fn test_switch_scenes_routes_to_one_event() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(
            &inner,
            r#"{"update-type": "SwitchScenes", "scene-name": "Scene A"}"#,
        );

        assert_eq!(
            events.recv().await,
            Some(Event::SceneSwitched { scene_name: "Scene A".into() })
        );
    }

    #[tokio::test]
    async fn test_volume_changed_maps_channel_and_inverts_final_flag() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(
            &inner,
            r#"{"update-type": "VolumeChanged", "channel": "microphone",
                "volume": 0.4, "muted": true, "finalValue": false}"#,
        );
        dispatch(
            &inner,
            r#"{"update-type": "VolumeChanged", "channel": "desktop",
                "volume": 1.0, "muted": false, "finalValue": true}"#,
        );

        assert_eq!(
            events.recv().await,
            Some(Event::MicrophoneVolumeChanged {
                volume: 0.4,
                muted: true,
                adjusting: true,
            })
        );
        assert_eq!(
            events.recv().await,
            Some(Event::DesktopVolumeChanged {
                volume: 1.0,
                muted: false,
                adjusting: false,
            })
        );
    }

    #[tokio::test]
    async fn test_item_notifications_route_directly() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(
            &inner,
            r#"{"update-type": "ItemRenamed",
                "old-name": "cam", "new-name": "camera"}"#,
        );
        dispatch(
            &inner,
            r#"{"update-type": "ItemVisible",
                "item-name": "overlay", "visible": false}"#,
        );

        assert_eq!(
            events.recv().await,
            Some(Event::ItemRenamed {
                old_name: "cam".into(),
                new_name: "camera".into(),
            })
        );
        assert_eq!(
            events.recv().await,
            Some(Event::ItemVisibilityChanged {
                item_name: "overlay".into(),
                visible: false,
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_kind_emits_nothing() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(
            &inner,
            r#"{"update-type": "HologramEngaged", "power": 9000}"#,
        );
        // A recognized frame afterwards proves the unknown one was
        // swallowed rather than queued or fatal.
        dispatch(&inner, r#"{"update-type": "Exit"}"#);

        assert_eq!(events.recv().await, Some(Event::Exited));
    }

    #[tokio::test]
    async fn test_undecodable_frame_does_not_panic() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(&inner, "not json at all");
        dispatch(&inner, r#"{"update-type": "RecordingStarted"}"#);

        assert_eq!(events.recv().await, Some(Event::RecordingStarted));
    }

    #[tokio::test]
    async fn test_stale_response_is_swallowed() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        // No request with this identifier is pending.
        dispatch(&inner, r#"{"message-id": "17", "status": "ok"}"#);
        dispatch(&inner, r#"{"update-type": "ProfileChanged"}"#);

        assert_eq!(events.recv().await, Some(Event::ProfileChanged));
    }

    #[tokio::test]
    async fn test_repopulate_sources_carries_payload() {
        let inner = detached_inner();
        let mut events = inner.subscribe();

        dispatch(
            &inner,
            r#"{"update-type": "RepopulateSources",
                "sources": [{"name": "mic", "audio": true}]}"#,
        );

        match events.recv().await {
            Some(Event::SourcesRepopulated { sources }) => {
                assert_eq!(sources.len(), 1);
                assert_eq!(sources[0].name, "mic");
                assert!(sources[0].audio);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
