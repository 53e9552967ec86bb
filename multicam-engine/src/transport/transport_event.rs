use multicam_core::{CandidateInit, PeerId};
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

pub type RemoteTrack = Arc<TrackRemote>;

/// Connection state of the underlying media transport. Distinct from
/// negotiation state: `Connected` is reported only when the transport
/// itself has full connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a transport pushes into the orchestrator's event loop.
///
/// Every event carries the epoch of the transport that produced it, so
/// events from a superseded transport for the same peer can be discarded.
#[derive(Clone)]
pub enum TransportEvent {
    StateChanged {
        peer: PeerId,
        epoch: u64,
        state: TransportState,
    },
    CandidateGenerated {
        peer: PeerId,
        epoch: u64,
        candidate: CandidateInit,
    },
    /// The transport signalled "no more candidates". Reported once per
    /// session and never forwarded to the remote.
    GatheringComplete { peer: PeerId, epoch: u64 },
    TrackArrived {
        peer: PeerId,
        epoch: u64,
        track: RemoteTrack,
    },
}

impl TransportEvent {
    pub fn peer(&self) -> &PeerId {
        match self {
            TransportEvent::StateChanged { peer, .. }
            | TransportEvent::CandidateGenerated { peer, .. }
            | TransportEvent::GatheringComplete { peer, .. }
            | TransportEvent::TrackArrived { peer, .. } => peer,
        }
    }

    pub fn epoch(&self) -> u64 {
        match self {
            TransportEvent::StateChanged { epoch, .. }
            | TransportEvent::CandidateGenerated { epoch, .. }
            | TransportEvent::GatheringComplete { epoch, .. }
            | TransportEvent::TrackArrived { epoch, .. } => *epoch,
        }
    }
}
