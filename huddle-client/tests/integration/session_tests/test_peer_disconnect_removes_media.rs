use crate::integration::init_tracing;
use crate::utils::{MockCall, expect_silence, join_room, recv_within};
use huddle_client::session::SessionEvent;
use huddle_server::RelayService;

#[tokio::test]
async fn departure_tears_down_the_peer_and_its_media() {
    init_tracing();

    let relay = RelayService::new();
    let mut a = join_room(&relay, "demo");
    let mut b = join_room(&relay, "demo");

    // Let both reach steady state.
    for client in [&mut a, &mut b] {
        assert!(matches!(
            recv_within(&mut client.events, "peer joined").await,
            SessionEvent::PeerJoined(_)
        ));
        assert!(matches!(
            recv_within(&mut client.events, "media added").await,
            SessionEvent::MediaAdded { .. }
        ));
    }

    b.handle.leave();

    match recv_within(&mut a.events, "media removed").await {
        SessionEvent::MediaRemoved(id) => assert_eq!(id, b.id),
        other => panic!("expected media removed, got {:?}", other),
    }
    match recv_within(&mut a.events, "peer left").await {
        SessionEvent::PeerLeft(id) => assert_eq!(id, b.id),
        other => panic!("expected peer left, got {:?}", other),
    }
    expect_silence(&mut a.events, "event after departure").await;

    assert!(a.media_map.is_empty());
    let a_to_b = a.factory.transport_for(&b.id).await.unwrap();
    a_to_b.wait_for_call(&MockCall::Close).await;
}
