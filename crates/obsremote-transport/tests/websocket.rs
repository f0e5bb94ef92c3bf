//! Integration tests for the WebSocket client transport.
//!
//! These tests spin up a real WebSocket server (raw `tokio-tungstenite`
//! acceptor) and dial it with [`WebSocketConnection`] to verify that text
//! frames actually flow over the network, that the subprotocol is offered
//! during the handshake, and that clean closes surface as `None`.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use obsremote_transport::{Connection, Transport, WebSocketTransport};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::handshake::server::{
        Request, Response,
    };
    use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs =
        tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on an OS-assigned port and accepts one WebSocket
    /// connection, capturing the subprotocol the client offered.
    async fn accept_one(
        listener: TcpListener,
    ) -> (ServerWs, Option<String>) {
        let (stream, _) = listener.accept().await.expect("should accept");

        let mut offered = None;
        let ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &Request, mut resp: Response| {
                if let Some(proto) =
                    req.headers().get(SEC_WEBSOCKET_PROTOCOL)
                {
                    offered =
                        Some(proto.to_str().unwrap_or_default().to_owned());
                    resp.headers_mut()
                        .insert(SEC_WEBSOCKET_PROTOCOL, proto.clone());
                }
                Ok(resp)
            },
        )
        .await
        .expect("handshake should succeed");

        (ws, offered)
    }

    #[tokio::test]
    async fn test_connect_offers_subprotocol_and_exchanges_text() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(accept_one(listener));

        let transport = WebSocketTransport;
        let conn = transport
            .connect(&format!("ws://{addr}"), "obsapi")
            .await
            .expect("client should connect");
        assert!(conn.id().into_inner() > 0);

        let (mut server_ws, offered) = server.await.unwrap();
        assert_eq!(offered.as_deref(), Some("obsapi"));

        // --- Client sends, server receives ---
        conn.send(r#"{"request-type":"GetVersion","message-id":"1"}"#)
            .await
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(
            msg.into_text().unwrap().as_str(),
            r#"{"request-type":"GetVersion","message-id":"1"}"#
        );

        // --- Server sends, client receives ---
        server_ws
            .send(Message::text(r#"{"status":"ok","message-id":"1"}"#))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have a frame");
        assert_eq!(received, r#"{"status":"ok","message-id":"1"}"#);
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_server_close() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(accept_one(listener));

        let conn = WebSocketTransport
            .connect(&format!("ws://{addr}"), "obsapi")
            .await
            .expect("client should connect");

        let (mut server_ws, _) = server.await.unwrap();
        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_binary_utf8_frames_are_delivered_as_text() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(accept_one(listener));

        let conn = WebSocketTransport
            .connect(&format!("ws://{addr}"), "obsapi")
            .await
            .expect("client should connect");

        let (mut server_ws, _) = server.await.unwrap();
        server_ws
            .send(Message::Binary(
                br#"{"update-type":"Exit"}"#.to_vec().into(),
            ))
            .await
            .unwrap();

        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, r#"{"update-type":"Exit"}"#);
    }

    #[tokio::test]
    async fn test_connect_refused_surfaces_error() {
        // Nothing is listening on this address.
        let result = WebSocketTransport
            .connect("ws://127.0.0.1:9", "obsapi")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique_per_dial() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (a, _) = listener.accept().await.unwrap();
            let _ws_a = tokio_tungstenite::accept_async(a).await.unwrap();
            let (b, _) = listener.accept().await.unwrap();
            let _ws_b = tokio_tungstenite::accept_async(b).await.unwrap();
            (_ws_a, _ws_b)
        });

        let first = WebSocketTransport
            .connect(&format!("ws://{addr}"), "obsapi")
            .await
            .unwrap();
        let second = WebSocketTransport
            .connect(&format!("ws://{addr}"), "obsapi")
            .await
            .unwrap();
        let _streams = server.await.unwrap();

        assert_ne!(first.id(), second.id());
    }
}
