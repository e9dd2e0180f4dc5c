//! Integration tests for the WebSocket connection.
//!
//! These spin up a real listener and dial it, so bytes actually cross a
//! socket in both directions.

#[cfg(feature = "websocket")]
mod websocket {
    use f2l_transport::{Connection, Listener, WebSocketConnection, WebSocketListener};

    /// Binds on an OS-assigned port and returns the listener with its URL.
    async fn bind_local() -> (WebSocketListener, String) {
        let listener = WebSocketListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        (listener, format!("ws://{addr}"))
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut listener, url) = bind_local().await;

        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });

        let client = WebSocketConnection::connect(&url)
            .await
            .expect("client should connect");
        let server = server_handle.await.expect("task should complete");

        assert!(server.id().into_inner() > 0);
        assert_ne!(server.id(), client.id());

        server.send(b"hello from foundation").await.unwrap();
        let received = client.recv().await.unwrap().expect("should have data");
        assert_eq!(received, b"hello from foundation");

        client.send(b"hello from logic").await.unwrap();
        let received = server.recv().await.unwrap().expect("should have data");
        assert_eq!(received, b"hello from logic");

        server.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // The reader is parked in recv() when the writer sends; a shared
        // lock over the whole stream would hang here.
        let (mut listener, url) = bind_local().await;
        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });
        let client = std::sync::Arc::new(
            WebSocketConnection::connect(&url).await.expect("should connect"),
        );
        let server = server_handle.await.unwrap();

        let reader = {
            let client = std::sync::Arc::clone(&client);
            tokio::spawn(async move { client.recv().await })
        };
        tokio::task::yield_now().await;

        client.send(b"request").await.unwrap();
        assert_eq!(server.recv().await.unwrap(), Some(b"request".to_vec()));

        server.send(b"reply").await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got, Some(b"reply".to_vec()));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_peer_close() {
        let (mut listener, url) = bind_local().await;
        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let server = server_handle.await.unwrap();

        client.close().await.unwrap();

        let result = server.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on peer close");
    }
}
