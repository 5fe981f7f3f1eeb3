use huddle_core::ClientId;

/// Starting role for one peer pair: a side that discovers the peer offers,
/// a side first hearing from the peer through an offer answers. Both sides
/// can discover each other and offer concurrently; the crossed offer is then
/// absorbed by the live session as a renegotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Offerer,
    Answerer,
}

/// Per-peer negotiation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
    Closed,
}

/// Commands routed into a peer's inbound queue by the session controller.
#[derive(Debug)]
pub enum PeerCommand {
    /// Remote description from the peer. On a live machine this is a
    /// renegotiation, not a second connection.
    RemoteOffer { sdp: String },
    RemoteAnswer { sdp: String },
    RemoteCandidate { candidate: String },
    Close,
}

/// Updates a peer session reports back to its session controller.
#[derive(Debug)]
pub enum PeerUpdate<M> {
    MediaAdded { id: ClientId, media: M },
    Closed { id: ClientId },
}
