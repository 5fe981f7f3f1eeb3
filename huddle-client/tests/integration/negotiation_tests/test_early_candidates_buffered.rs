use crate::integration::init_tracing;
use crate::utils::{MockCall, spawn_mock_peer, wait_for_state};
use huddle_client::peer::{NegotiationState, PeerCommand, Role};

#[tokio::test]
async fn candidates_before_offer_apply_in_order() {
    init_tracing();

    let peer = spawn_mock_peer(Role::Answerer);

    // Candidates race ahead of the offer over the relay.
    peer.handle
        .send(PeerCommand::RemoteCandidate {
            candidate: "cand-1".to_string(),
        })
        .await;
    peer.handle
        .send(PeerCommand::RemoteCandidate {
            candidate: "cand-2".to_string(),
        })
        .await;
    peer.handle
        .send(PeerCommand::RemoteOffer {
            sdp: "remote-offer".to_string(),
        })
        .await;

    wait_for_state(&peer.handle, NegotiationState::Stable).await;

    let calls = peer.transport.calls().await;
    assert_eq!(
        calls,
        vec![
            MockCall::SetRemoteOffer("remote-offer".to_string()),
            MockCall::AddCandidate("cand-1".to_string()),
            MockCall::AddCandidate("cand-2".to_string()),
            MockCall::CreateAnswer,
        ]
    );
}

#[tokio::test]
async fn candidates_after_stable_apply_immediately() {
    init_tracing();

    let peer = spawn_mock_peer(Role::Answerer);
    peer.handle
        .send(PeerCommand::RemoteOffer {
            sdp: "remote-offer".to_string(),
        })
        .await;
    wait_for_state(&peer.handle, NegotiationState::Stable).await;

    peer.handle
        .send(PeerCommand::RemoteCandidate {
            candidate: "late-cand".to_string(),
        })
        .await;

    peer.transport
        .wait_for_call(&MockCall::AddCandidate("late-cand".to_string()))
        .await;
}
