use async_trait::async_trait;
use huddle_client::transport::{PeerTransport, TransportError, TransportEvent, TransportFactory};
use huddle_core::ClientId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateOffer,
    CreateAnswer,
    SetRemoteOffer(String),
    SetRemoteAnswer(String),
    AddCandidate(String),
    Close,
}

/// Scripted stand-in for the platform transport. Records every call in
/// order and emits a media handle once a remote description is applied.
#[derive(Clone)]
pub struct MockTransport {
    remote: ClientId,
    calls: Arc<Mutex<Vec<MockCall>>>,
    events: mpsc::Sender<TransportEvent<String>>,
    failing: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(remote: ClientId, events: mpsc::Sender<TransportEvent<String>>) -> Self {
        Self {
            remote,
            calls: Arc::new(Mutex::new(Vec::new())),
            events,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    /// Polls until the given call shows up in the log.
    pub async fn wait_for_call(&self, wanted: &MockCall) {
        for _ in 0..100 {
            if self.calls.lock().await.contains(wanted) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!(
            "call {:?} never recorded, saw {:?}",
            wanted,
            self.calls.lock().await
        );
    }

    /// Makes every subsequent description/candidate operation fail.
    pub fn set_failing(&self) {
        self.failing.store(true, Ordering::Relaxed);
    }

    /// Injects a transport event into the session's queue, as the platform
    /// layer would.
    pub async fn emit(&self, event: TransportEvent<String>) {
        let _ = self.events.send(event).await;
    }

    async fn record(&self, call: MockCall) {
        self.calls.lock().await.push(call);
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Relaxed) {
            Err(TransportError::Description("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        self.check()?;
        self.record(MockCall::CreateOffer).await;
        Ok(format!("offer-for-{}", self.remote))
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        self.check()?;
        self.record(MockCall::CreateAnswer).await;
        Ok(format!("answer-for-{}", self.remote))
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError> {
        self.check()?;
        self.record(MockCall::SetRemoteOffer(sdp)).await;
        let _ = self
            .events
            .send(TransportEvent::RemoteMedia(format!("media-{}", self.remote)))
            .await;
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError> {
        self.check()?;
        self.record(MockCall::SetRemoteAnswer(sdp)).await;
        let _ = self
            .events
            .send(TransportEvent::RemoteMedia(format!("media-{}", self.remote)))
            .await;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), TransportError> {
        self.check()
            .map_err(|_| TransportError::Candidate("mock failure".to_string()))?;
        self.record(MockCall::AddCandidate(candidate)).await;
        Ok(())
    }

    async fn close(&self) {
        self.record(MockCall::Close).await;
    }
}

/// Factory handing out `MockTransport`s and remembering them by remote id,
/// so tests can inspect calls made by sessions the controller owns.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    transports: Arc<Mutex<HashMap<ClientId, MockTransport>>>,
    fail_create: Arc<AtomicBool>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn transport_for(&self, id: &ClientId) -> Option<MockTransport> {
        self.transports.lock().await.get(id).cloned()
    }

    pub async fn created(&self) -> usize {
        self.transports.lock().await.len()
    }

    pub fn fail_creation(&self) {
        self.fail_create.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    type Media = String;
    type Transport = MockTransport;

    async fn create(
        &self,
        remote: ClientId,
        events: mpsc::Sender<TransportEvent<String>>,
    ) -> Result<MockTransport, TransportError> {
        if self.fail_create.load(Ordering::Relaxed) {
            return Err(TransportError::Setup("mock factory failure".to_string()));
        }

        let transport = MockTransport::new(remote.clone(), events);
        self.transports
            .lock()
            .await
            .insert(remote, transport.clone());
        Ok(transport)
    }
}
