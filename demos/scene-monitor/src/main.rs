//! Connects to a remote controller and prints everything it pushes.
//!
//! Usage: `scene-monitor [address] [password]`
//!
//! `address` is "host" or "host:port", defaulting to `localhost` and
//! the protocol port. Set `RUST_LOG=debug` to also see raw stream
//! status traffic.

use obsremote::prelude::*;

#[tokio::main]
async fn main() -> Result<(), ObsRemoteError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info")
                }),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_default();
    let password = args.next();

    let client = ObsRemoteClient::new();
    let mut events = client.subscribe();

    client.connect(&address, password.as_deref()).await?;

    let version = client.get_version().await?;
    let (current_scene, scenes) = client.get_scene_list().await?;
    tracing::info!(
        version,
        %current_scene,
        scene_count = scenes.len(),
        "connected"
    );

    while let Some(event) = events.recv().await {
        match event {
            Event::SceneSwitched { scene_name } => {
                tracing::info!(%scene_name, "scene switched");
            }
            Event::SceneListChanged { scenes, .. } => {
                let names: Vec<_> =
                    scenes.iter().map(|s| s.name.as_str()).collect();
                tracing::info!(?names, "scene list changed");
            }
            Event::StreamStatus(stats) => {
                tracing::debug!(
                    fps = stats.fps,
                    kbps = stats.bytes_per_sec * 8 / 1000,
                    dropped = stats.dropped_frames,
                    "stream status"
                );
            }
            Event::ConnectionClosed | Event::ConnectionFailed => {
                tracing::info!("connection gone, exiting");
                break;
            }
            Event::Exited => {
                tracing::info!("controller exited");
                break;
            }
            other => tracing::info!(event = ?other, "event"),
        }
    }

    Ok(())
}
