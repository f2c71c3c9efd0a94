//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics, broadcast
//! delivery, event serialization, and graceful shutdown behaviour.

use axum::extract::ws::Message;
use catalogd_api::ws::{CatalogEvent, WsManager};

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() increments the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_increments_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: remove() decrements the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_decrements_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string()).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast() sends message to all connected clients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_sends_to_all_connections() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    let mut rx3 = manager.add("conn-3".to_string()).await;

    let payload = Message::Text("hello everyone".into());
    manager.broadcast(payload).await;

    let msg1 = rx1.recv().await.expect("rx1 should receive broadcast");
    let msg2 = rx2.recv().await.expect("rx2 should receive broadcast");
    let msg3 = rx3.recv().await.expect("rx3 should receive broadcast");

    assert!(matches!(&msg1, Message::Text(t) if *t == "hello everyone"));
    assert!(matches!(&msg2, Message::Text(t) if *t == "hello everyone"));
    assert!(matches!(&msg3, Message::Text(t) if *t == "hello everyone"));
}

// ---------------------------------------------------------------------------
// Test: broadcast() skips closed channels without failing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let manager = WsManager::new();

    let rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    // Simulate a dropped client whose receive loop has not cleaned up yet.
    drop(rx1);

    manager.broadcast(Message::Text("still here".into())).await;

    let msg = rx2.recv().await.expect("rx2 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if *t == "still here"));
}

// ---------------------------------------------------------------------------
// Test: broadcast_event() delivers the event as a JSON text frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_event_delivers_json_payload() {
    let manager = WsManager::new();

    let mut rx = manager.add("conn-1".to_string()).await;

    manager
        .broadcast_event(&CatalogEvent::ProductDeleted { id: 99 })
        .await;

    let msg = rx.recv().await.expect("should receive event");
    let Message::Text(text) = msg else {
        panic!("Expected Text frame, got: {msg:?}");
    };

    let json: serde_json::Value = serde_json::from_str(&text).expect("payload should be JSON");
    assert_eq!(json["type"], "product_deleted");
    assert_eq!(json["id"], 99);
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping frame to every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping_to_every_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.ping_all().await;

    let msg1 = rx1.recv().await.expect("rx1 should receive ping");
    let msg2 = rx2.recv().await.expect("rx2 should receive ping");

    assert!(matches!(msg1, Message::Ping(_)));
    assert!(matches!(msg2, Message::Ping(_)));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    // Connection count should be zero after shutdown.
    assert_eq!(manager.connection_count().await, 0);

    // Both receivers should have received a Close message.
    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}
