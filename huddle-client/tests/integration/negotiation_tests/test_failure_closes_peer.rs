use crate::integration::init_tracing;
use crate::utils::{MockCall, recv_within, spawn_mock_peer, wait_for_state};
use huddle_client::peer::{NegotiationState, PeerCommand, PeerUpdate, Role};
use std::time::Duration;

#[tokio::test]
async fn offer_failure_closes_the_session() {
    init_tracing();

    let mut peer = spawn_mock_peer(Role::Offerer);
    peer.transport.set_failing();

    // spawn_mock_peer starts the task after we flip the flag, so the very
    // first description call fails.
    wait_for_state(&peer.handle, NegotiationState::Closed).await;

    match recv_within(&mut peer.update_rx, "closed update").await {
        PeerUpdate::Closed { id } => assert_eq!(id, peer.remote_id),
        other => panic!("expected closed, got {:?}", other),
    }
    assert!(peer.signal_rx.try_recv().is_err());
    assert!(peer.transport.calls().await.contains(&MockCall::Close));
}

#[tokio::test]
async fn mid_session_failure_closes_the_session() {
    init_tracing();

    let mut peer = spawn_mock_peer(Role::Answerer);
    peer.transport.set_failing();

    peer.handle
        .send(PeerCommand::RemoteOffer {
            sdp: "remote-offer".to_string(),
        })
        .await;

    wait_for_state(&peer.handle, NegotiationState::Closed).await;
    match recv_within(&mut peer.update_rx, "closed update").await {
        PeerUpdate::Closed { id } => assert_eq!(id, peer.remote_id),
        other => panic!("expected closed, got {:?}", other),
    }
}

#[tokio::test]
async fn commands_after_close_are_noops() {
    init_tracing();

    let peer = spawn_mock_peer(Role::Answerer);
    peer.handle.send(PeerCommand::Close).await;
    wait_for_state(&peer.handle, NegotiationState::Closed).await;

    peer.handle
        .send(PeerCommand::RemoteCandidate {
            candidate: "stale".to_string(),
        })
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(peer.transport.calls().await, vec![MockCall::Close]);
}
