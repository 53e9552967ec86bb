mod candidate_buffer;
mod orchestrator;
mod peer_session;
mod status_sink;

pub use candidate_buffer::CandidateBuffer;
pub use orchestrator::{EndpointRole, Orchestrator};
pub use peer_session::{NegotiationRole, NegotiationState, PeerSession, SignalOutcome};
pub use status_sink::StatusSink;
