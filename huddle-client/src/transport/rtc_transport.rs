use crate::media::LocalMedia;
use crate::transport::{PeerTransport, TransportError, TransportEvent, TransportFactory};
use async_trait::async_trait;
use huddle_core::ClientId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

#[derive(Debug, Clone)]
pub struct RtcConfig {
    pub stun_servers: Vec<String>,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            stun_servers: vec![
                "stun:stun.l.google.com:19302".to_string(),
                "stun:stun1.l.google.com:19302".to_string(),
            ],
        }
    }
}

/// The remote media handle for one peer: the set of tracks received so far.
/// Re-published whenever a new track arrives, so the exposed handle for a
/// peer always covers its full stream.
#[derive(Clone)]
pub struct RemoteStream {
    pub tracks: Vec<(RTPCodecType, Arc<TrackRemote>)>,
}

/// Shared local capture tracks, attached read-only to every peer connection.
/// Mute/video-off flip the enable flags the capture collaborator consults;
/// peer connections are never touched.
pub struct RtcLocalMedia {
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    audio_enabled: AtomicBool,
    video_enabled: AtomicBool,
}

impl RtcLocalMedia {
    pub fn new(tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self {
            tracks,
            audio_enabled: AtomicBool::new(true),
            video_enabled: AtomicBool::new(true),
        }
    }

    pub fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled.load(Ordering::Relaxed)
    }

    pub fn video_enabled(&self) -> bool {
        self.video_enabled.load(Ordering::Relaxed)
    }
}

impl LocalMedia for RtcLocalMedia {
    fn set_audio_enabled(&self, enabled: bool) {
        self.audio_enabled.store(enabled, Ordering::Relaxed);
    }

    fn set_video_enabled(&self, enabled: bool) {
        self.video_enabled.store(enabled, Ordering::Relaxed);
    }

    fn release(&self) {
        self.audio_enabled.store(false, Ordering::Relaxed);
        self.video_enabled.store(false, Ordering::Relaxed);
    }
}

pub struct RtcTransportFactory {
    config: RtcConfig,
    local: Arc<RtcLocalMedia>,
}

impl RtcTransportFactory {
    pub fn new(config: RtcConfig, local: Arc<RtcLocalMedia>) -> Self {
        Self { config, local }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    type Media = RemoteStream;
    type Transport = RtcPeerTransport;

    async fn create(
        &self,
        remote: ClientId,
        events: mpsc::Sender<TransportEvent<RemoteStream>>,
    ) -> Result<RtcPeerTransport, TransportError> {
        RtcPeerTransport::new(remote, &self.config, &self.local, events).await
    }
}

pub struct RtcPeerTransport {
    remote: ClientId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerTransport {
    async fn new(
        remote: ClientId,
        config: &RtcConfig,
        local: &Arc<RtcLocalMedia>,
        events: mpsc::Sender<TransportEvent<RemoteStream>>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: config.stun_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?,
        );

        for track in local.tracks() {
            peer_connection
                .add_track(Arc::clone(track))
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?;
        }

        // Trickle ICE: forward local candidates as soon as they are gathered.
        let ice_tx = events.clone();
        let ice_remote = remote.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let remote = ice_remote.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                debug!("ICE candidate gathered for peer {}", remote);
                let _ = tx.send(TransportEvent::LocalCandidate(str_candidate)).await;
            })
        }));

        // Accumulate incoming tracks into a single handle per peer, so the
        // exposed media map holds exactly one entry for this remote.
        let track_tx = events.clone();
        let track_remote_id = remote.clone();
        let received: Arc<Mutex<Vec<(RTPCodecType, Arc<TrackRemote>)>>> =
            Arc::new(Mutex::new(Vec::new()));
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let remote = track_remote_id.clone();
            let received = Arc::clone(&received);

            Box::pin(async move {
                info!("Received {} track from peer {}", track.kind(), remote);

                let snapshot = {
                    let mut tracks = received.lock().await;
                    tracks.push((track.kind(), track));
                    tracks.clone()
                };
                let _ = tx
                    .send(TransportEvent::RemoteMedia(RemoteStream { tracks: snapshot }))
                    .await;
            })
        }));

        let state_tx = events.clone();
        let state_remote = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let remote = state_remote.clone();

                Box::pin(async move {
                    info!("Connection state for peer {}: {:?}", remote, s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::Closed).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        Ok(Self {
            remote,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerTransport for RtcPeerTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        Ok(answer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::offer(sdp)
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::answer(sdp)
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))
    }

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), TransportError> {
        let candidate: RTCIceCandidateInit = serde_json::from_str(&candidate)
            .map_err(|e| TransportError::Candidate(e.to_string()))?;
        self.peer_connection
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| TransportError::Candidate(e.to_string()))
    }

    async fn close(&self) {
        debug!("Closing connection to peer {}", self.remote);
        let _ = self.peer_connection.close().await;
    }
}
