pub mod model;

pub use model::{
    AggregateStatus, CandidateInit, IceServerConfig, PeerId, Role, SessionId, SignalMessage,
    SlotHealth, SlotNumber, SlotStatus, DEFAULT_SLOT_COUNT,
};
