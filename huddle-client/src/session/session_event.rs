use huddle_core::ClientId;

/// Room-level events exposed to the UI collaborator.
#[derive(Debug)]
pub enum SessionEvent<M> {
    PeerJoined(ClientId),
    PeerLeft(ClientId),
    MediaAdded { id: ClientId, media: M },
    MediaRemoved(ClientId),
}

/// Commands a `SessionHandle` feeds into the controller loop.
#[derive(Debug)]
pub enum SessionCommand {
    Leave,
    SetAudioEnabled(bool),
    SetVideoEnabled(bool),
}
