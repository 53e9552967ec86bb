use async_trait::async_trait;
use multicam_core::{CandidateInit, PeerId};
use multicam_engine::{
    EngineError, MediaBinding, SessionTransport, TransportConfig, TransportEvent,
    TransportFactory, TransportState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Test-side view of one created transport: records what the session
/// applied to it and can inject transport events into the orchestrator.
pub struct TransportHandle {
    pub peer: PeerId,
    pub epoch: u64,
    pub produced_media: bool,
    applied: Mutex<Vec<String>>,
    closed: AtomicBool,
    events: mpsc::Sender<TransportEvent>,
}

impl TransportHandle {
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Poll until at least `n` operations were applied to this transport.
    pub async fn wait_for_applied(&self, n: usize, timeout_ms: u64) -> bool {
        let deadline =
            tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
        loop {
            if self.applied().len() >= n {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn wait_until_closed(&self, timeout_ms: u64) -> bool {
        let deadline =
            tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
        loop {
            if self.is_closed() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn emit_state(&self, state: TransportState) {
        let _ = self
            .events
            .send(TransportEvent::StateChanged {
                peer: self.peer.clone(),
                epoch: self.epoch,
                state,
            })
            .await;
    }

    pub async fn emit_candidate(&self, candidate: CandidateInit) {
        let _ = self
            .events
            .send(TransportEvent::CandidateGenerated {
                peer: self.peer.clone(),
                epoch: self.epoch,
                candidate,
            })
            .await;
    }

    pub async fn emit_gathering_complete(&self) {
        let _ = self
            .events
            .send(TransportEvent::GatheringComplete {
                peer: self.peer.clone(),
                epoch: self.epoch,
            })
            .await;
    }

    fn record(&self, entry: String) {
        self.applied.lock().unwrap().push(entry);
    }
}

struct MockTransport(Arc<TransportHandle>);

#[async_trait]
impl SessionTransport for MockTransport {
    async fn create_offer(&self) -> Result<String, EngineError> {
        self.0.record("create-offer".into());
        Ok(format!("offer-from-{}", self.0.peer))
    }

    async fn accept_offer(&self, sdp: String) -> Result<String, EngineError> {
        self.0.record(format!("accept-offer:{sdp}"));
        Ok(format!("answer-to-{}", self.0.peer))
    }

    async fn accept_answer(&self, sdp: String) -> Result<(), EngineError> {
        self.0.record(format!("accept-answer:{sdp}"));
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), EngineError> {
        self.0.record(format!("candidate:{}", candidate.candidate));
        Ok(())
    }

    async fn close(&self) {
        self.0.closed.store(true, Ordering::SeqCst);
    }
}

/// Factory handing out recording transports; keeps a handle per creation
/// so tests can inspect and drive each one.
#[derive(Default)]
pub struct MockTransportFactory {
    handles: Mutex<Vec<Arc<TransportHandle>>>,
    fail_next: AtomicBool,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> Vec<Arc<TransportHandle>> {
        self.handles.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    pub fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Poll until `n` transports have been created.
    pub async fn wait_for_created(&self, n: usize, timeout_ms: u64) -> bool {
        let deadline =
            tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
        loop {
            if self.created() >= n {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        peer: PeerId,
        epoch: u64,
        media: MediaBinding,
        _config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn SessionTransport>, EngineError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Negotiation("transport allocation refused".into()));
        }

        let handle = Arc::new(TransportHandle {
            peer,
            epoch,
            produced_media: matches!(media, MediaBinding::Produce(_)),
            applied: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            events,
        });
        self.handles.lock().unwrap().push(handle.clone());
        Ok(Box::new(MockTransport(handle)))
    }
}
