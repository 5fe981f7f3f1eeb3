use crate::model::client::ClientId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Messages a client sends to the relay. SDP and ICE payloads are opaque
/// strings; the relay routes them by `to` without inspecting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join {
        room: RoomId,
    },
    Offer {
        offer: String,
        to: ClientId,
    },
    Answer {
        answer: String,
        to: ClientId,
    },
    IceCandidate {
        candidate: String,
        to: ClientId,
    },
}

/// Messages the relay sends to a client. Point-to-point payloads carry `from`,
/// stamped by the relay with the sender's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Welcome {
        id: ClientId,
    },
    ExistingUsers {
        users: Vec<ClientId>,
    },
    UserConnected {
        id: ClientId,
    },
    UserDisconnected {
        id: ClientId,
    },
    Offer {
        offer: String,
        from: ClientId,
    },
    Answer {
        answer: String,
        from: ClientId,
    },
    IceCandidate {
        candidate: String,
        from: ClientId,
    },
}
