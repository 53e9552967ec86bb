pub mod channel;
pub mod error;
pub mod media;
pub mod session;
pub mod transport;

pub use channel::{ChannelEvent, RendezvousChannel, WsChannel, WsChannelConfig};
pub use error::EngineError;
pub use media::{LocalTrack, MediaProvider};
pub use session::{
    CandidateBuffer, EndpointRole, NegotiationRole, NegotiationState, Orchestrator, PeerSession,
    SignalOutcome, StatusSink,
};
pub use transport::{
    MediaBinding, RemoteTrack, RtcTransport, RtcTransportFactory, SessionTransport,
    TransportConfig, TransportEvent, TransportFactory, TransportState,
};
