mod rendezvous;
mod ws_channel;

pub use rendezvous::{ChannelEvent, RendezvousChannel};
pub use ws_channel::{WsChannel, WsChannelConfig};
