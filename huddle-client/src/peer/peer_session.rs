use crate::peer::{NegotiationState, PeerCommand, PeerUpdate, Role};
use crate::transport::{PeerTransport, TransportError, TransportEvent};
use huddle_core::{ClientId, ClientMessage};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMMAND_QUEUE_DEPTH: usize = 100;

/// Controller-side handle to a running peer session.
pub struct PeerHandle {
    commands: mpsc::Sender<PeerCommand>,
    state: watch::Receiver<NegotiationState>,
    task: JoinHandle<()>,
}

impl PeerHandle {
    pub async fn send(&self, cmd: PeerCommand) {
        let _ = self.commands.send(cmd).await;
    }

    pub fn state(&self) -> NegotiationState {
        *self.state.borrow()
    }

    /// Asks the session to tear down and waits for it to finish.
    pub async fn close(self) {
        let _ = self.commands.send(PeerCommand::Close).await;
        let _ = self.task.await;
    }
}

/// The negotiation state machine for one remote peer.
///
/// Runs as its own task over a single inbound queue merged with the
/// transport's event queue, so description operations for this peer are
/// processed strictly in arrival order. Once the task exits, late commands
/// and transport completions land on dropped channels and become no-ops.
pub struct PeerSession<T, M> {
    remote_id: ClientId,
    role: Role,
    state: NegotiationState,
    transport: T,
    remote_description_set: bool,
    pending_candidates: Vec<String>,
    command_rx: mpsc::Receiver<PeerCommand>,
    transport_rx: mpsc::Receiver<TransportEvent<M>>,
    signal_tx: mpsc::UnboundedSender<ClientMessage>,
    update_tx: mpsc::UnboundedSender<PeerUpdate<M>>,
    state_tx: watch::Sender<NegotiationState>,
}

enum Step {
    Continue,
    Stop,
}

impl<T, M> PeerSession<T, M>
where
    T: PeerTransport + 'static,
    M: Send + 'static,
{
    /// Spawns the session task and returns the controller-side handle.
    pub fn spawn(
        remote_id: ClientId,
        role: Role,
        transport: T,
        transport_rx: mpsc::Receiver<TransportEvent<M>>,
        signal_tx: mpsc::UnboundedSender<ClientMessage>,
        update_tx: mpsc::UnboundedSender<PeerUpdate<M>>,
    ) -> PeerHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (state_tx, state_rx) = watch::channel(NegotiationState::New);

        let session = Self {
            remote_id,
            role,
            state: NegotiationState::New,
            transport,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            command_rx,
            transport_rx,
            signal_tx,
            update_tx,
            state_tx,
        };

        let task = tokio::spawn(session.run());

        PeerHandle {
            commands: command_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(mut self) {
        if self.role == Role::Offerer {
            if let Err(e) = self.send_offer().await {
                warn!("Negotiation with {} failed: {}", self.remote_id, e);
                self.shutdown().await;
                return;
            }
        }

        loop {
            let step = tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                evt = self.transport_rx.recv() => match evt {
                    Some(evt) => self.handle_transport_event(evt),
                    None => break,
                },
            };

            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Stop) => break,
                Err(e) => {
                    warn!("Negotiation with {} failed: {}", self.remote_id, e);
                    break;
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle_command(&mut self, cmd: PeerCommand) -> Result<Step, TransportError> {
        match cmd {
            PeerCommand::RemoteOffer { sdp } => {
                self.apply_remote_offer(sdp).await?;
                Ok(Step::Continue)
            }
            PeerCommand::RemoteAnswer { sdp } => {
                if self.state != NegotiationState::HaveLocalOffer {
                    warn!(
                        "Ignoring answer from {} in state {:?}",
                        self.remote_id, self.state
                    );
                    return Ok(Step::Continue);
                }
                self.transport.set_remote_answer(sdp).await?;
                self.remote_description_set = true;
                self.flush_candidates().await?;
                self.set_state(NegotiationState::Stable);
                info!("Negotiation with {} stable (offerer)", self.remote_id);
                Ok(Step::Continue)
            }
            PeerCommand::RemoteCandidate { candidate } => {
                // Candidates arriving before the remote description are held
                // back and applied later in receipt order.
                if self.remote_description_set {
                    self.transport.add_ice_candidate(candidate).await?;
                } else {
                    self.pending_candidates.push(candidate);
                }
                Ok(Step::Continue)
            }
            PeerCommand::Close => Ok(Step::Stop),
        }
    }

    fn handle_transport_event(&mut self, evt: TransportEvent<M>) -> Result<Step, TransportError> {
        match evt {
            TransportEvent::LocalCandidate(candidate) => {
                let _ = self.signal_tx.send(ClientMessage::IceCandidate {
                    candidate,
                    to: self.remote_id.clone(),
                });
                Ok(Step::Continue)
            }
            TransportEvent::RemoteMedia(media) => {
                let _ = self.update_tx.send(PeerUpdate::MediaAdded {
                    id: self.remote_id.clone(),
                    media,
                });
                Ok(Step::Continue)
            }
            TransportEvent::Closed => {
                debug!("Transport closed for peer {}", self.remote_id);
                Ok(Step::Stop)
            }
        }
    }

    async fn send_offer(&mut self) -> Result<(), TransportError> {
        let offer = self.transport.create_offer().await?;
        let _ = self.signal_tx.send(ClientMessage::Offer {
            offer,
            to: self.remote_id.clone(),
        });
        self.set_state(NegotiationState::HaveLocalOffer);
        Ok(())
    }

    async fn apply_remote_offer(&mut self, sdp: String) -> Result<(), TransportError> {
        self.set_state(NegotiationState::HaveRemoteOffer);
        self.transport.set_remote_offer(sdp).await?;
        self.remote_description_set = true;
        self.flush_candidates().await?;

        let answer = self.transport.create_answer().await?;
        let _ = self.signal_tx.send(ClientMessage::Answer {
            answer,
            to: self.remote_id.clone(),
        });
        self.set_state(NegotiationState::Stable);
        info!("Negotiation with {} stable (answerer)", self.remote_id);
        Ok(())
    }

    async fn flush_candidates(&mut self) -> Result<(), TransportError> {
        for candidate in self.pending_candidates.drain(..) {
            self.transport.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.set_state(NegotiationState::Closed);
        self.transport.close().await;
        let _ = self.update_tx.send(PeerUpdate::Closed {
            id: self.remote_id.clone(),
        });
    }

    fn set_state(&mut self, state: NegotiationState) {
        self.state = state;
        let _ = self.state_tx.send(state);
    }
}
