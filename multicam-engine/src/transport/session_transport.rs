use crate::error::EngineError;
use crate::media::LocalTrack;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use async_trait::async_trait;
use multicam_core::{CandidateInit, PeerId};
use tokio::sync::mpsc;

/// Media attached to a newly created transport.
pub enum MediaBinding {
    /// Controller side: receive-only audio and video.
    Consume,
    /// Source side: publish these local tracks.
    Produce(Vec<LocalTrack>),
}

/// Offer/answer surface of one peer connection, as the peer session state
/// machine drives it. Asynchronous events (state changes, local candidates,
/// remote tracks) arrive separately as [`TransportEvent`]s.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Create a local description and set it locally; returns the SDP to
    /// transmit.
    async fn create_offer(&self) -> Result<String, EngineError>;

    /// Apply a remote offer, create and locally set an answer; returns the
    /// answer SDP to transmit.
    async fn accept_offer(&self, sdp: String) -> Result<String, EngineError>;

    /// Apply a remote answer.
    async fn accept_answer(&self, sdp: String) -> Result<(), EngineError>;

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), EngineError>;

    async fn close(&self);
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        peer: PeerId,
        epoch: u64,
        media: MediaBinding,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn SessionTransport>, EngineError>;
}
