use huddle_core::{ClientId, RoomId};
use std::collections::HashMap;

/// Result of a join: everything the relay needs to notify the right clients.
#[derive(Debug)]
pub struct JoinOutcome {
    /// Room the client implicitly left, with the members remaining in it.
    pub left: Option<(RoomId, Vec<ClientId>)>,
    /// The other members of the target room at join time, in join order.
    pub peers: Vec<ClientId>,
    /// False when the client was already a member (idempotent re-join).
    pub newly_joined: bool,
}

/// Room membership table: room -> ordered members, plus a reverse index.
///
/// Invariants: a client belongs to at most one room at a time, and no empty
/// room entry is ever retained.
#[derive(Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, Vec<ClientId>>,
    membership: HashMap<ClientId, RoomId>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the client to `room`, leaving its previous room first if needed.
    pub fn join(&mut self, client: ClientId, room: RoomId) -> JoinOutcome {
        if self.membership.get(&client) == Some(&room) {
            // Re-join of the current room: membership unchanged, but the
            // caller still runs the notification flow.
            return JoinOutcome {
                left: None,
                peers: self.peers_of(&room, &client),
                newly_joined: false,
            };
        }

        let left = self.leave(&client);

        let members = self.rooms.entry(room.clone()).or_default();
        let peers = members.clone();
        members.push(client.clone());
        self.membership.insert(client, room);

        JoinOutcome {
            left,
            peers,
            newly_joined: true,
        }
    }

    /// Removes the client from its current room. Returns the room it left and
    /// the members remaining there; `None` when the client had no room.
    pub fn leave(&mut self, client: &ClientId) -> Option<(RoomId, Vec<ClientId>)> {
        let room = self.membership.remove(client)?;

        let remaining = match self.rooms.get_mut(&room) {
            Some(members) => {
                members.retain(|id| id != client);
                members.clone()
            }
            None => Vec::new(),
        };

        if remaining.is_empty() {
            self.rooms.remove(&room);
        }

        Some((room, remaining))
    }

    pub fn room_of(&self, client: &ClientId) -> Option<&RoomId> {
        self.membership.get(client)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self) -> usize {
        self.membership.len()
    }

    fn peers_of(&self, room: &RoomId, client: &ClientId) -> Vec<ClientId> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter(|id| *id != client)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
