pub mod test_peer_disconnect_removes_media;
pub mod test_two_clients_full_session;
