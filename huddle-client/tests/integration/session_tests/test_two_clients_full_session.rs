use crate::integration::init_tracing;
use crate::utils::{MockCall, TestClient, join_room, recv_within};
use huddle_client::session::SessionEvent;
use huddle_client::transport::TransportEvent;
use huddle_core::ClientId;
use huddle_server::RelayService;

async fn expect_connected(client: &mut TestClient, other: &ClientId) {
    match recv_within(&mut client.events, "peer joined").await {
        SessionEvent::PeerJoined(id) => assert_eq!(&id, other),
        other => panic!("expected peer joined, got {:?}", other),
    }
    match recv_within(&mut client.events, "media added").await {
        SessionEvent::MediaAdded { id, media } => {
            assert_eq!(&id, other);
            assert_eq!(media, format!("media-{}", other));
        }
        other => panic!("expected media, got {:?}", other),
    }
}

#[tokio::test]
async fn two_clients_negotiate_and_exchange_candidates() {
    init_tracing();

    let relay = RelayService::new();
    let mut a = join_room(&relay, "demo");
    let mut b = join_room(&relay, "demo");

    // Both sides discover each other and end up with one media handle.
    expect_connected(&mut a, &b.id).await;
    expect_connected(&mut b, &a.id).await;

    assert_eq!(a.media_map.len(), 1);
    assert_eq!(b.media_map.len(), 1);
    assert!(a.media_map.contains_key(&b.id));
    assert!(b.media_map.contains_key(&a.id));

    // Both discover concurrently, so each pair negotiates over crossed
    // offers without opening a second session.
    assert_eq!(a.factory.created().await, 1);
    assert_eq!(b.factory.created().await, 1);

    // Trickled candidates cross the relay and land on the other transport.
    let a_to_b = a.factory.transport_for(&b.id).await.unwrap();
    a_to_b
        .emit(TransportEvent::LocalCandidate("cand-from-a".to_string()))
        .await;

    let b_to_a = b.factory.transport_for(&a.id).await.unwrap();
    b_to_a
        .wait_for_call(&MockCall::AddCandidate("cand-from-a".to_string()))
        .await;
}
