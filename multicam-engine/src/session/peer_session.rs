use crate::error::EngineError;
use crate::session::candidate_buffer::CandidateBuffer;
use crate::transport::{SessionTransport, TransportState};
use multicam_core::{CandidateInit, PeerId, SlotHealth, SlotNumber};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

/// Negotiation progress of one peer session. Distinct from transport
/// connectivity: `AnswerApplied` means the description exchange finished,
/// not that media flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    OfferSent,
    OfferReceived,
    AnswerApplied,
    Failed,
    Closed,
}

/// Result of feeding a remote description into the session. A stale signal
/// (duplicate, late, or otherwise out of sequence) is observable but
/// neither an error nor a state change.
#[derive(Debug, PartialEq, Eq)]
pub enum SignalOutcome<T> {
    Applied(T),
    Stale(NegotiationState),
}

/// One controller-to-source pairing: a peer connection, its negotiation
/// state machine, and its candidate buffer. Owned exclusively by the
/// orchestrator that created it.
pub struct PeerSession {
    remote_peer: PeerId,
    slot: SlotNumber,
    role: NegotiationRole,
    epoch: u64,
    state: NegotiationState,
    health: SlotHealth,
    buffer: CandidateBuffer,
    transport: Box<dyn SessionTransport>,
    gathering_complete_seen: bool,
    local_candidates: usize,
    closed: bool,
}

impl PeerSession {
    pub fn new(
        role: NegotiationRole,
        remote_peer: PeerId,
        slot: SlotNumber,
        epoch: u64,
        transport: Box<dyn SessionTransport>,
    ) -> Self {
        Self {
            remote_peer,
            slot,
            role,
            epoch,
            state: NegotiationState::Idle,
            health: SlotHealth::Waiting,
            buffer: CandidateBuffer::new(),
            transport,
            gathering_complete_seen: false,
            local_candidates: 0,
            closed: false,
        }
    }

    pub fn remote_peer(&self) -> &PeerId {
        &self.remote_peer
    }

    pub fn slot(&self) -> SlotNumber {
        self.slot
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn health(&self) -> SlotHealth {
        self.health
    }

    /// Offerer path: create the local description and hand back the SDP for
    /// transmission over the rendezvous channel.
    pub async fn start_offer(&mut self) -> Result<String, EngineError> {
        debug_assert_eq!(self.role, NegotiationRole::Offerer);
        if self.state != NegotiationState::Idle {
            return Err(EngineError::Negotiation(format!(
                "offer already started for {} (state {:?})",
                self.remote_peer, self.state
            )));
        }

        match self.transport.create_offer().await {
            Ok(sdp) => {
                self.state = NegotiationState::OfferSent;
                Ok(sdp)
            }
            Err(e) => {
                self.state = NegotiationState::Failed;
                Err(e)
            }
        }
    }

    /// Apply a remote answer. Valid only while an offer is outstanding; in
    /// any other state the answer is a stale signal and nothing changes.
    pub async fn apply_answer(&mut self, sdp: String) -> Result<SignalOutcome<()>, EngineError> {
        if self.state != NegotiationState::OfferSent {
            debug!(
                peer = %self.remote_peer,
                state = ?self.state,
                "ignoring answer outside offer-sent"
            );
            return Ok(SignalOutcome::Stale(self.state));
        }

        match self.transport.accept_answer(sdp).await {
            Ok(()) => {
                self.state = NegotiationState::AnswerApplied;
                self.flush_buffered_candidates().await;
                Ok(SignalOutcome::Applied(()))
            }
            Err(e) => {
                self.state = NegotiationState::Failed;
                Err(e)
            }
        }
    }

    /// Answerer path: apply a remote offer, produce an answer, and flush
    /// any candidates that raced ahead of it. Valid from `Idle` only; a
    /// renegotiating remote gets a fresh session instead of layered state.
    pub async fn apply_offer(&mut self, sdp: String) -> Result<SignalOutcome<String>, EngineError> {
        if self.state != NegotiationState::Idle {
            debug!(
                peer = %self.remote_peer,
                state = ?self.state,
                "ignoring offer outside idle"
            );
            return Ok(SignalOutcome::Stale(self.state));
        }

        self.state = NegotiationState::OfferReceived;
        match self.transport.accept_offer(sdp).await {
            Ok(answer) => {
                self.state = NegotiationState::AnswerApplied;
                self.flush_buffered_candidates().await;
                Ok(SignalOutcome::Applied(answer))
            }
            Err(e) => {
                self.state = NegotiationState::Failed;
                Err(e)
            }
        }
    }

    /// Apply a remote candidate now if both descriptions are set, otherwise
    /// queue it. A rejected candidate is non-fatal: the caller logs it and
    /// the session keeps waiting for further candidates.
    pub async fn add_candidate(&mut self, candidate: CandidateInit) -> Result<(), EngineError> {
        match self.state {
            NegotiationState::AnswerApplied => self.transport.add_candidate(candidate).await,
            NegotiationState::Failed | NegotiationState::Closed => {
                debug!(peer = %self.remote_peer, "dropping candidate for terminal session");
                Ok(())
            }
            _ => {
                self.buffer.enqueue(candidate);
                debug!(
                    peer = %self.remote_peer,
                    buffered = self.buffer.len(),
                    "buffered candidate until negotiation completes"
                );
                Ok(())
            }
        }
    }

    /// Map a transport connection-state change onto this session's health.
    /// Returns the new health when it changed. `Disconnected` is transient;
    /// `Failed` is terminal and moves negotiation to `Closed` (the
    /// orchestrator recreates a fresh session if the remote rejoins).
    pub fn observe_transport(&mut self, state: TransportState) -> Option<SlotHealth> {
        let health = match state {
            TransportState::Connected => SlotHealth::Connected,
            TransportState::Disconnected => SlotHealth::Disconnected,
            TransportState::Failed => {
                self.state = NegotiationState::Closed;
                SlotHealth::Failed
            }
            TransportState::New | TransportState::Connecting | TransportState::Closed => {
                return None
            }
        };

        if health == self.health {
            return None;
        }
        self.health = health;
        Some(health)
    }

    /// Count a locally generated candidate as it is forwarded.
    pub fn note_local_candidate(&mut self) {
        self.local_candidates += 1;
    }

    pub fn local_candidates(&self) -> usize {
        self.local_candidates
    }

    /// The transport's end-of-gathering marker is reported once per
    /// session; repeats return false.
    pub fn note_gathering_complete(&mut self) -> bool {
        if self.gathering_complete_seen {
            return false;
        }
        self.gathering_complete_seen = true;
        true
    }

    /// Release the transport and discard buffered candidates. Idempotent.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.state = NegotiationState::Closed;
        self.buffer.clear();
        self.transport.close().await;
    }

    async fn flush_buffered_candidates(&mut self) {
        for candidate in self.buffer.flush() {
            if let Err(e) = self.transport.add_candidate(candidate).await {
                warn!(peer = %self.remote_peer, "buffered candidate rejected: {e}");
            }
        }
    }
}
