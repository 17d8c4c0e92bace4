//! Heartbeat against a local WebSocket server

mod common;

use common::MockWsServer;
use gremsocket::{spawn_heartbeat, HeartbeatEvent, PongTracker, WsMessage};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_heartbeat_pongs_are_tracked() {
    let server = MockWsServer::start().await;
    let tracker = Arc::new(PongTracker::new(Duration::from_secs(1)));
    let session = Arc::new(
        gremsocket::builder()
            .host(server.ws_url())
            .read_wait(Duration::from_millis(500))
            .pong_handler(tracker.clone())
            .build()
            .unwrap(),
    );
    session.connect().await.unwrap();

    let heartbeat = spawn_heartbeat(Arc::clone(&session), Duration::from_millis(50));

    let mut pongs = 0;
    while pongs < 2 {
        match session.read().await.unwrap() {
            WsMessage::Pong(_) => pongs += 1,
            other => panic!("unexpected frame {:?}", other),
        }
    }

    assert_eq!(heartbeat.try_recv_event(), Some(HeartbeatEvent::Pinged));
    heartbeat.stop().await;

    assert!(tracker.pongs_received() >= 2);
    assert!(tracker.is_healthy());
    session.close().await.unwrap();
}
