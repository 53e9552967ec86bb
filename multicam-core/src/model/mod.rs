mod peer;
mod session;
mod signaling;
mod slot;
mod status;

pub use peer::PeerId;
pub use session::SessionId;
pub use signaling::{CandidateInit, IceServerConfig, Role, SignalMessage};
pub use slot::{SlotNumber, SlotNumberError, DEFAULT_SLOT_COUNT};
pub use status::{AggregateStatus, SlotHealth, SlotStatus};
