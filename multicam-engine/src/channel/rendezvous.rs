use async_trait::async_trait;
use multicam_core::{CandidateInit, PeerId, SlotNumber};

/// Outgoing half of the rendezvous relay, as seen by the orchestrator.
///
/// Every message names its recipient explicitly; the engine never
/// broadcasts. Delivery is fire-and-forget: the relay does not guarantee
/// delivery across its own reconnects, so failures are logged by the
/// adapter, not propagated.
#[async_trait]
pub trait RendezvousChannel: Send + Sync {
    async fn send_offer(&self, peer: PeerId, slot: SlotNumber, sdp: String);

    async fn send_answer(&self, peer: PeerId, slot: SlotNumber, sdp: String);

    async fn send_candidate(&self, peer: PeerId, slot: SlotNumber, candidate: CandidateInit);
}

/// Incoming rendezvous traffic, delivered to the orchestrator one event at
/// a time.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A remote endpoint appeared in the session.
    PeerJoined { peer: PeerId, slot: SlotNumber },
    /// A remote endpoint departed; its peer session must be torn down.
    PeerLeft { peer: PeerId, slot: SlotNumber },
    Offer {
        peer: PeerId,
        slot: SlotNumber,
        sdp: String,
    },
    Answer {
        peer: PeerId,
        slot: SlotNumber,
        sdp: String,
    },
    Candidate {
        peer: PeerId,
        slot: SlotNumber,
        candidate: CandidateInit,
    },
    /// The relay link dropped. Outgoing signals may be lost until
    /// `Reconnected`; silence from remotes means "still negotiating",
    /// not failure.
    Disrupted,
    Reconnected,
    /// The relay link is gone for good (reconnect attempts exhausted or
    /// orderly shutdown). The orchestrator tears down.
    Closed,
}
